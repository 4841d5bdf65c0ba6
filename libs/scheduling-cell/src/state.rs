// libs/scheduling-cell/src/state.rs

use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::booking::BookingService;
use crate::services::notify::{NoopNotifier, NotificationPort, WebhookNotifier};
use crate::services::slots::SlotGenerator;
use crate::store::{AppointmentStore, InMemoryStore, ScheduleStore};

/// Shared router state: configuration plus the store and notification
/// ports. Services themselves are cheap and constructed per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub schedules: Arc<dyn ScheduleStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub notifier: Arc<dyn NotificationPort>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            config,
            schedules,
            appointments,
            notifier,
        }
    }

    /// State backed by the bundled in-memory store, with the webhook
    /// notifier when one is configured.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let notifier: Arc<dyn NotificationPort> = match &config.notification_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(NoopNotifier),
        };
        Self {
            config,
            schedules: store.clone(),
            appointments: store,
            notifier,
        }
    }

    pub fn slot_generator(&self) -> SlotGenerator {
        SlotGenerator::new(Arc::clone(&self.schedules), Arc::clone(&self.appointments))
    }

    pub fn booking_service(&self) -> BookingService {
        BookingService::new(
            Arc::clone(&self.schedules),
            Arc::clone(&self.appointments),
            Arc::clone(&self.notifier),
        )
    }
}
