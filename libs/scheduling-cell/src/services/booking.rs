// libs/scheduling-cell/src/services/booking.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, BookingIntent, SchedulingError,
};
use crate::store::{AppointmentStore, ScheduleStore};
use crate::time;

use super::notify::NotificationPort;

/// Validates booking requests against availability and conflict rules,
/// then commits accepted bookings through the store's atomic
/// re-check-and-insert.
pub struct BookingService {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn NotificationPort>,
}

impl BookingService {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            schedules,
            appointments,
            notifier,
        }
    }

    /// Run the validation checklist for a proposed booking. The order is
    /// fixed (time, availability, doctor conflict, patient conflict) so
    /// error reporting stays deterministic. On success returns an intent
    /// that has not been persisted yet.
    pub async fn validate(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        scheduled_at: DateTime<Utc>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<BookingIntent, SchedulingError> {
        debug!(
            "Validating booking for patient {} with doctor {} at {}",
            patient_id, doctor_id, scheduled_at
        );

        if scheduled_at <= now {
            return Err(SchedulingError::PastTime);
        }

        let window = self
            .schedules
            .covering_window(doctor_id, scheduled_at)
            .await?
            .ok_or(SchedulingError::DoctorUnavailable)?;
        debug_assert!(time::contains(window.start_time, window.end_time, scheduled_at));

        if self
            .appointments
            .doctor_conflict_exists(doctor_id, scheduled_at)
            .await?
        {
            return Err(SchedulingError::DoctorConflict);
        }

        if self
            .appointments
            .patient_conflict_exists(patient_id, scheduled_at)
            .await?
        {
            return Err(SchedulingError::PatientConflict);
        }

        Ok(BookingIntent {
            patient_id,
            doctor_id,
            scheduled_at,
            reason,
            linked_window_id: Some(window.id),
        })
    }

    /// Persist a validated intent. The store re-runs the conflict checks
    /// atomically with the insert; losing that race surfaces as
    /// `Conflict` even though validation passed. Once the insert begins
    /// it runs to completion, so a committed booking is never half-done.
    pub async fn commit(&self, intent: BookingIntent) -> Result<Appointment, SchedulingError> {
        let appointment = self.appointments.insert_checked(intent).await?;
        info!(
            "Appointment {} booked for doctor {} at {}",
            appointment.id, appointment.doctor_id, appointment.scheduled_at
        );
        self.notify_booked(appointment.clone());
        Ok(appointment)
    }

    /// Validate then commit in one call. No locks are held between the
    /// two phases; staleness is resolved by the commit-time re-check.
    pub async fn book(
        &self,
        patient_id: Uuid,
        doctor_id: Uuid,
        scheduled_at: DateTime<Utc>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let intent = self
            .validate(patient_id, doctor_id, scheduled_at, reason, now)
            .await?;
        self.commit(intent).await
    }

    /// Apply a status transition; the store enforces the state machine
    /// under its own lock.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.appointments.update_status(appointment_id, next).await?;
        info!("Appointment {} transitioned to {}", appointment.id, next);
        self.notify_status_changed(appointment.clone());
        Ok(appointment)
    }

    fn notify_booked(&self, appointment: Appointment) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.booking_confirmed(&appointment).await {
                warn!("Booking notification for {} failed: {}", appointment.id, e);
            }
        });
    }

    fn notify_status_changed(&self, appointment: Appointment) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.status_changed(&appointment).await {
                warn!("Status notification for {} failed: {}", appointment.id, e);
            }
        });
    }
}
