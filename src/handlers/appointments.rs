//! Appointment HTTP handlers.
//!
//! - GET /appointments - Every appointment
//! - GET /appointments/booked_slots - Provider, date and time of every booking
//! - GET /appointments/{provider_id}/{date} - Booked times of one provider on one date

use crate::{
    error::AppError,
    extract::{Json, Path},
    models::appointment::{Appointment, BookedSlot, BookedTime},
    state::AppState,
};
use axum::extract::State;
use chrono::NaiveDate;

pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    Ok(Json(state.store.list_appointments().await?))
}

/// Slots already taken across all providers, for the booking calendar.
pub async fn booked_slots(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookedSlot>>, AppError> {
    Ok(Json(state.store.booked_slots().await?))
}

/// Times already booked with `provider_id` on `date`.
///
/// # Response (200 OK)
///
/// ```json
/// [{ "appointment_time": "09:30:00" }, { "appointment_time": "14:00:00" }]
/// ```
pub async fn booked_times(
    State(state): State<AppState>,
    Path((provider_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<Vec<BookedTime>>, AppError> {
    Ok(Json(state.store.booked_times(provider_id, date).await?))
}
