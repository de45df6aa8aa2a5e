//! Partner HTTP handlers.
//!
//! - GET /partner - List all partners
//! - GET /partner/availability/{partner_id} - Availability of one partner
//! - GET /partner/availability/{partner_id}/{date} - Availability on one date

use crate::{
    error::AppError,
    extract::{Json, Path},
    models::partner::{Partner, ProviderAvailability},
    state::AppState,
};
use axum::extract::State;
use chrono::NaiveDate;

pub async fn list_partners(State(state): State<AppState>) -> Result<Json<Vec<Partner>>, AppError> {
    Ok(Json(state.store.list_partners().await?))
}

/// Availability rows published by a partner, keyed by provider number.
pub async fn get_availability(
    State(state): State<AppState>,
    Path(partner_id): Path<i64>,
) -> Result<Json<Vec<ProviderAvailability>>, AppError> {
    let rows = state.store.provider_availability(partner_id, None).await?;
    Ok(Json(rows))
}

/// Availability rows for a partner on one `YYYY-MM-DD` date.
pub async fn get_availability_on_date(
    State(state): State<AppState>,
    Path((partner_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<Vec<ProviderAvailability>>, AppError> {
    let rows = state
        .store
        .provider_availability(partner_id, Some(date))
        .await?;
    Ok(Json(rows))
}
