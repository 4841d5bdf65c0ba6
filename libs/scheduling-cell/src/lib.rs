pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;
pub mod store;
pub mod time;

// Re-export the core types and services for external use
pub use models::*;
pub use state::AppState;

pub use services::booking::BookingService;
pub use services::notify::{NoopNotifier, NotificationPort, WebhookNotifier};
pub use services::slots::SlotGenerator;
pub use store::{AppointmentStore, InMemoryStore, ScheduleStore};
