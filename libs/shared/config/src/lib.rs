use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    /// Default length of a bookable slot in minutes.
    pub default_slot_minutes: u32,
    /// UTC offset (in minutes) of the clinic's reference time zone,
    /// used when a request does not carry its own offset.
    pub clinic_utc_offset_minutes: i32,
    /// Optional webhook that receives booking notifications.
    pub notification_webhook_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            default_slot_minutes: env::var("DEFAULT_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("DEFAULT_SLOT_MINUTES not set, using 30");
                    30
                }),
            clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("CLINIC_UTC_OFFSET_MINUTES not set, using 0 (UTC)");
                    0
                }),
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL").ok(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - slot duration must divide one hour");
        }

        config
    }

    /// Slot duration must evenly divide an hour so that rounding "now" up
    /// to the next slot boundary is independent of the clinic offset.
    pub fn is_configured(&self) -> bool {
        self.default_slot_minutes > 0
            && 60 % self.default_slot_minutes == 0
            && self.clinic_utc_offset_minutes.unsigned_abs() < 24 * 60
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            default_slot_minutes: 30,
            clinic_utc_offset_minutes: 0,
            notification_webhook_url: None,
        }
    }
}
