// libs/scheduling-cell/src/store/mod.rs
//
// Data-access seam. Persistence technology is owned by an external
// collaborator; the engine only depends on these contracts. The bundled
// in-memory implementation backs tests and single-instance deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, AvailabilityWindow, BookingIntent, SchedulingError,
};

mod memory;

pub use memory::InMemoryStore;

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Windows with `is_available == true` whose `[start_time, end_time)`
    /// intersects `[from, to)`, ordered by start time. Overlapping windows
    /// for the same doctor are permitted and returned as-is.
    async fn list_windows_overlapping(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>, SchedulingError>;

    /// The available window covering `instant`, if any. Used by booking
    /// validation; when several windows cover the instant the earliest
    /// starting one is returned.
    async fn covering_window(
        &self,
        doctor_id: Uuid,
        instant: DateTime<Utc>,
    ) -> Result<Option<AvailabilityWindow>, SchedulingError>;

    /// Write path for the external schedule CRUD workflow.
    async fn set_window(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityWindow, SchedulingError>;
}

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Start timestamps of active (scheduled or confirmed) appointments
    /// for the doctor within `[from, to)`. Cancelled and completed
    /// appointments do not block slots.
    async fn list_booked(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SchedulingError>;

    async fn doctor_conflict_exists(
        &self,
        doctor_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SchedulingError>;

    async fn patient_conflict_exists(
        &self,
        patient_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SchedulingError>;

    /// Atomic re-check-and-insert: the doctor and patient conflict checks
    /// run inside the same atomic unit as the insert, so two concurrent
    /// bookings of one slot cannot both succeed. The race loser gets
    /// `Conflict`.
    async fn insert_checked(&self, intent: BookingIntent)
        -> Result<Appointment, SchedulingError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError>;

    /// Apply a status transition, validating it against the state machine
    /// under the same atomic unit that persists it.
    async fn update_status(
        &self,
        id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError>;

    /// All of a patient's appointments, newest first.
    async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError>;

    /// A doctor's appointments scheduled at or after `from`, ascending.
    async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError>;
}
