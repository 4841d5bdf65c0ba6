// libs/scheduling-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{CallerIdentity, Role};
use shared_models::error::AppError;

use crate::models::{
    Appointment, AvailabilityWindow, BookAppointmentRequest, SetWindowRequest,
    UpdateStatusRequest,
};
use crate::state::AppState;
use crate::time;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: Option<u32>,
    pub tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SchedulesQuery {
    pub doctor_id: Uuid,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// ==============================================================================
// SLOT AND SCHEDULE HANDLERS
// ==============================================================================

/// Free bookable slots for a doctor on a calendar day. An empty list is a
/// valid answer, not an error.
#[axum::debug_handler]
pub async fn list_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let duration = query
        .duration_minutes
        .unwrap_or(state.config.default_slot_minutes);
    if duration == 0 || 60 % duration != 0 {
        return Err(AppError::BadRequest(
            "Slot duration must evenly divide one hour".to_string(),
        ));
    }

    let offset = time::offset_from_minutes(
        query
            .tz_offset_minutes
            .unwrap_or(state.config.clinic_utc_offset_minutes),
    )?;

    let slots = state
        .slot_generator()
        .available_slots(query.doctor_id, query.date, offset, duration, Utc::now())
        .await?;

    let starts: Vec<String> = slots
        .iter()
        .map(|slot| slot.start_time.with_timezone(&offset).to_rfc3339())
        .collect();

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "date": query.date,
        "duration_minutes": duration,
        "slots": starts,
    })))
}

/// Availability windows for a doctor in a date range (defaults to the next
/// 30 days). Read-only view of the schedule CRUD collaborator's data.
#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<SchedulesQuery>,
) -> Result<Json<Vec<AvailabilityWindow>>, AppError> {
    let offset = time::offset_from_minutes(state.config.clinic_utc_offset_minutes)?;
    let today = Utc::now().with_timezone(&offset).date_naive();
    let from = query.from.unwrap_or(today);
    let to = query.to.unwrap_or(from + chrono::Duration::days(30));

    let (range_start, _) = time::day_bounds(from, offset);
    let (_, range_end) = time::day_bounds(to, offset);

    let windows = state
        .schedules
        .list_windows_overlapping(query.doctor_id, range_start, range_end)
        .await?;
    Ok(Json(windows))
}

/// Upsert an availability window. The schedule CRUD workflow lives
/// outside this engine; this write path exists for that collaborator and
/// deliberately permits overlapping windows per doctor.
#[axum::debug_handler]
pub async fn set_schedule(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<SetWindowRequest>,
) -> Result<Json<AvailabilityWindow>, AppError> {
    let is_own_schedule = caller.has_role(Role::Doctor) && caller.id == request.doctor_id;
    if !is_own_schedule && !caller.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to manage this doctor's schedule".to_string(),
        ));
    }

    let start_time = time::parse_instant(&request.start_time)?;
    let end_time = time::parse_instant(&request.end_time)?;
    if start_time >= end_time {
        return Err(AppError::BadRequest(
            "Window start time must be before end time".to_string(),
        ));
    }

    let now = Utc::now();
    let window = AvailabilityWindow {
        id: request.id.unwrap_or_else(Uuid::new_v4),
        doctor_id: request.doctor_id,
        start_time,
        end_time,
        is_available: request.is_available.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let stored = state.schedules.set_window(window).await?;
    Ok(Json(stored))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

/// Book an appointment. The patient id is always the caller's own id;
/// booking on behalf of someone else is not supported here.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let scheduled_at = time::parse_instant(&request.scheduled_at)?;

    let appointment = state
        .booking_service()
        .book(
            caller.id,
            request.doctor_id,
            scheduled_at,
            request.reason,
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.appointments.get(appointment_id).await?;
    ensure_party(&caller, &appointment)?;
    Ok(Json(appointment))
}

/// Apply a status transition (confirm, cancel, complete). Which parties
/// may trigger which transition is policy owned by the external caller
/// layer; this handler only requires the caller to be a party to the
/// appointment or an admin.
#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.appointments.get(appointment_id).await?;
    ensure_party(&caller, &appointment)?;

    let updated = state
        .booking_service()
        .update_status(appointment_id, request.status)
        .await?;
    Ok(Json(updated))
}

/// The caller's own appointments, newest first.
#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.appointments.list_for_patient(caller.id).await?;
    Ok(Json(appointments))
}

/// A doctor's appointments from the start of the current day, ascending.
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let is_own_listing = caller.has_role(Role::Doctor) && caller.id == doctor_id;
    if !is_own_listing && !caller.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to view this doctor's appointments".to_string(),
        ));
    }

    let offset = time::offset_from_minutes(state.config.clinic_utc_offset_minutes)?;
    let today = Utc::now().with_timezone(&offset).date_naive();
    let (day_start, _) = time::day_bounds(today, offset);

    let appointments = state.appointments.list_for_doctor(doctor_id, day_start).await?;
    Ok(Json(appointments))
}

fn ensure_party(caller: &CallerIdentity, appointment: &Appointment) -> Result<(), AppError> {
    let is_party = caller.id == appointment.patient_id || caller.id == appointment.doctor_id;
    if !is_party && !caller.is_admin() {
        return Err(AppError::Auth(
            "Not authorized to access this appointment".to_string(),
        ));
    }
    Ok(())
}
