// libs/scheduling-cell/src/services/notify.rs

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::models::Appointment;

/// Outbound notification port. Fire-and-forget: callers never await
/// delivery on the request path, and a failed notification never rolls
/// back a committed booking.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn booking_confirmed(&self, appointment: &Appointment) -> Result<()>;

    async fn status_changed(&self, appointment: &Appointment) -> Result<()>;
}

/// Posts booking events to a configured webhook, one JSON body per event.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    async fn post_event(&self, event: &str, appointment: &Appointment) -> Result<()> {
        debug!("Posting {} event for appointment {}", event, appointment.id);

        let body = json!({
            "event": event,
            "appointment": appointment,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Webhook error ({}): {}", status, error_text));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationPort for WebhookNotifier {
    async fn booking_confirmed(&self, appointment: &Appointment) -> Result<()> {
        self.post_event("appointment.booked", appointment).await
    }

    async fn status_changed(&self, appointment: &Appointment) -> Result<()> {
        self.post_event("appointment.status_changed", appointment).await
    }
}

/// Used when no webhook is configured and in tests.
pub struct NoopNotifier;

#[async_trait]
impl NotificationPort for NoopNotifier {
    async fn booking_confirmed(&self, appointment: &Appointment) -> Result<()> {
        debug!("Dropping booking notification for appointment {}", appointment.id);
        Ok(())
    }

    async fn status_changed(&self, appointment: &Appointment) -> Result<()> {
        debug!("Dropping status notification for appointment {}", appointment.id);
        Ok(())
    }
}
