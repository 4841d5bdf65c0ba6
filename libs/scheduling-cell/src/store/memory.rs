// libs/scheduling-cell/src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, AvailabilityWindow, BookingIntent, SchedulingError,
};
use crate::time;

use super::{AppointmentStore, ScheduleStore};

#[derive(Default)]
struct Inner {
    windows: HashMap<Uuid, AvailabilityWindow>,
    appointments: HashMap<Uuid, Appointment>,
}

impl Inner {
    fn doctor_conflict(&self, doctor_id: Uuid, at: DateTime<Utc>) -> bool {
        self.appointments.values().any(|appointment| {
            appointment.doctor_id == doctor_id
                && appointment.scheduled_at == at
                && appointment.status.is_active()
        })
    }

    fn patient_conflict(&self, patient_id: Uuid, at: DateTime<Utc>) -> bool {
        self.appointments.values().any(|appointment| {
            appointment.patient_id == patient_id
                && appointment.scheduled_at == at
                && appointment.status.is_active()
        })
    }
}

/// Single-process store. One mutex guards both maps, so the conflict
/// re-check and insert in `insert_checked` form one atomic unit, which is
/// what gives the engine its at-most-one-booking-per-slot guarantee here.
/// A SQL-backed implementation would rely on partial unique indexes over
/// `(doctor_id, scheduled_at)` and `(patient_id, scheduled_at)` instead.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryStore {
    async fn list_windows_overlapping(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AvailabilityWindow>, SchedulingError> {
        let inner = self.inner.lock().await;
        let mut windows: Vec<AvailabilityWindow> = inner
            .windows
            .values()
            .filter(|window| {
                window.doctor_id == doctor_id
                    && window.is_available
                    && time::overlaps(window.start_time, window.end_time, from, to)
            })
            .cloned()
            .collect();
        windows.sort_by_key(|window| window.start_time);
        Ok(windows)
    }

    async fn covering_window(
        &self,
        doctor_id: Uuid,
        instant: DateTime<Utc>,
    ) -> Result<Option<AvailabilityWindow>, SchedulingError> {
        let inner = self.inner.lock().await;
        let mut covering: Vec<&AvailabilityWindow> = inner
            .windows
            .values()
            .filter(|window| {
                window.doctor_id == doctor_id
                    && window.is_available
                    && time::contains(window.start_time, window.end_time, instant)
            })
            .collect();
        covering.sort_by_key(|window| window.start_time);
        Ok(covering.first().map(|window| (*window).clone()))
    }

    async fn set_window(
        &self,
        window: AvailabilityWindow,
    ) -> Result<AvailabilityWindow, SchedulingError> {
        if window.start_time >= window.end_time {
            return Err(SchedulingError::Store(
                "Window start time must be before end time".to_string(),
            ));
        }
        let mut inner = self.inner.lock().await;
        debug!("Storing availability window {} for doctor {}", window.id, window.doctor_id);
        inner.windows.insert(window.id, window.clone());
        Ok(window)
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn list_booked(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, SchedulingError> {
        let inner = self.inner.lock().await;
        let mut booked: Vec<DateTime<Utc>> = inner
            .appointments
            .values()
            .filter(|appointment| {
                appointment.doctor_id == doctor_id
                    && appointment.status.is_active()
                    && time::contains(from, to, appointment.scheduled_at)
            })
            .map(|appointment| appointment.scheduled_at)
            .collect();
        booked.sort();
        Ok(booked)
    }

    async fn doctor_conflict_exists(
        &self,
        doctor_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SchedulingError> {
        let inner = self.inner.lock().await;
        Ok(inner.doctor_conflict(doctor_id, at))
    }

    async fn patient_conflict_exists(
        &self,
        patient_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SchedulingError> {
        let inner = self.inner.lock().await;
        Ok(inner.patient_conflict(patient_id, at))
    }

    async fn insert_checked(
        &self,
        intent: BookingIntent,
    ) -> Result<Appointment, SchedulingError> {
        let mut inner = self.inner.lock().await;

        // Commit-time re-check: validation ran without locks, so the slot
        // may have been taken in the meantime.
        if inner.doctor_conflict(intent.doctor_id, intent.scheduled_at)
            || inner.patient_conflict(intent.patient_id, intent.scheduled_at)
        {
            warn!(
                "Commit-time conflict for doctor {} at {}",
                intent.doctor_id, intent.scheduled_at
            );
            return Err(SchedulingError::Conflict);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: intent.patient_id,
            doctor_id: intent.doctor_id,
            scheduled_at: intent.scheduled_at,
            status: AppointmentStatus::Scheduled,
            reason: intent.reason,
            linked_window_id: intent.linked_window_id,
            created_at: now,
            updated_at: now,
        };
        inner.appointments.insert(appointment.id, appointment.clone());
        debug!(
            "Appointment {} committed for doctor {} at {}",
            appointment.id, appointment.doctor_id, appointment.scheduled_at
        );
        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let inner = self.inner.lock().await;
        inner
            .appointments
            .get(&id)
            .cloned()
            .ok_or(SchedulingError::NotFound)
    }

    async fn update_status(
        &self,
        id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let mut inner = self.inner.lock().await;
        let appointment = inner
            .appointments
            .get_mut(&id)
            .ok_or(SchedulingError::NotFound)?;

        if !appointment.status.can_transition_to(next) {
            return Err(SchedulingError::InvalidTransition {
                from: appointment.status,
                to: next,
            });
        }

        appointment.status = next;
        appointment.updated_at = Utc::now();
        debug!("Appointment {} moved to {}", id, next);
        Ok(appointment.clone())
    }

    async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let inner = self.inner.lock().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| appointment.patient_id == patient_id)
            .cloned()
            .collect();
        appointments.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
        Ok(appointments)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let inner = self.inner.lock().await;
        let mut appointments: Vec<Appointment> = inner
            .appointments
            .values()
            .filter(|appointment| {
                appointment.doctor_id == doctor_id && appointment.scheduled_at >= from
            })
            .cloned()
            .collect();
        appointments.sort_by_key(|appointment| appointment.scheduled_at);
        Ok(appointments)
    }
}
