//! Reminder trigger endpoint.
//!
//! Meant to be hit by an external cron. The response goes out as soon as the
//! due appointments are known; mails are delivered by a background task.

use crate::{error::AppError, services::reminder_service, state::AppState};
use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: String,

    /// Number of reminders handed to the background task
    pub queued: usize,
}

/// Queue reminder mails for appointments in the next 24 hours.
///
/// # Endpoint
///
/// `POST /send-reminder`
///
/// # Response (200 OK)
///
/// ```json
/// { "message": "Reminders are being sent in the background", "queued": 3 }
/// ```
///
/// Appointments still being delivered by an earlier trigger are not queued
/// again. A store failure while selecting appointments is reported as 500.
/// Mail failures happen after the response and are only logged.
pub async fn send_reminder(
    State(state): State<AppState>,
) -> Result<Json<ReminderResponse>, AppError> {
    tracing::info!("Reminder run triggered");

    let due = state
        .reminders
        .claim_due(state.store.as_ref(), Utc::now().naive_utc())
        .await?;
    let queued = due.len();

    tokio::spawn(reminder_service::deliver_reminders(
        state.store.clone(),
        state.mailer.clone(),
        state.reminders.clone(),
        due,
    ));

    Ok(Json(ReminderResponse {
        message: "Reminders are being sent in the background".to_string(),
        queued,
    }))
}
