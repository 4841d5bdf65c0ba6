// libs/scheduling-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// CORE SCHEDULING MODELS
// ==============================================================================

/// A doctor-declared open interval during which bookings may be placed.
/// Created and edited by the doctor-management workflow; this engine only
/// reads it when generating slots and validating bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Windows flagged unavailable are excluded from slot generation but
    /// retained for audit.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    /// Weak back-reference to the window this was booked against. The
    /// window may be deleted later; this is lookup only, not ownership.
    pub linked_window_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Active appointments are the only ones that block a time slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }

    /// State machine: Scheduled -> Confirmed | Cancelled | Completed,
    /// Confirmed -> Completed | Cancelled. Cancelled and Completed are
    /// terminal.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Scheduled, Completed)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A fixed-duration candidate booking interval derived from a window.
/// Ephemeral: recomputed on each query, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A booking that passed validation but has not been persisted yet.
/// Commit re-runs the conflict checks atomically with the insert.
#[derive(Debug, Clone)]
pub struct BookingIntent {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub linked_window_id: Option<Uuid>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking request body. `scheduled_at` is kept as a raw string so that
/// offset-less timestamps fail with `InvalidTimeZone` instead of a generic
/// deserialization error. The patient id always comes from the caller
/// identity, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub scheduled_at: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// Upsert body for the external schedule CRUD write path. Overlapping
/// windows for the same doctor are permitted; only bookings are subject
/// to non-overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetWindowRequest {
    pub id: Option<Uuid>,
    pub doctor_id: Uuid,
    pub start_time: String,
    pub end_time: String,
    pub is_available: Option<bool>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Timestamp must carry an explicit UTC offset: {0}")]
    InvalidTimeZone(String),

    #[error("Appointment time must be in the future")]
    PastTime,

    #[error("The doctor is not available at the selected time")]
    DoctorUnavailable,

    #[error("The doctor already has an appointment at this time")]
    DoctorConflict,

    #[error("You already have an appointment at this time")]
    PatientConflict,

    #[error("The slot was taken before the booking could be committed; re-fetch availability and retry")]
    Conflict,

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment not found")]
    NotFound,

    #[error("Store error: {0}")]
    Store(String),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        let message = err.to_string();
        match err {
            SchedulingError::InvalidTimeZone(_) | SchedulingError::PastTime => {
                AppError::BadRequest(message)
            }
            SchedulingError::DoctorUnavailable | SchedulingError::InvalidTransition { .. } => {
                AppError::Unprocessable(message)
            }
            SchedulingError::DoctorConflict
            | SchedulingError::PatientConflict
            | SchedulingError::Conflict => AppError::Conflict(message),
            SchedulingError::NotFound => AppError::NotFound(message),
            SchedulingError::Store(_) => AppError::Database(message),
        }
    }
}
