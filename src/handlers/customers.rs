//! Customer HTTP handlers.
//!
//! - GET /customers - List all customers
//! - GET /customers/lookup?email= - Exactly one customer by email
//! - GET /api/customers?email= - Lookup through the upstream customer directory

use crate::{
    error::AppError,
    extract::{Json, Query},
    models::customer::{Customer, EmailQuery},
    state::AppState,
};
use axum::extract::State;
use serde_json::Value;

pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(state.store.list_customers().await?))
}

/// Find the customer registered with `email`.
///
/// # Response
///
/// - **Success (200 OK)**: the single matching customer
/// - **Error (404)**: no customer has this email
/// - **Error (500)**: store failure
pub async fn lookup_customer(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Customer>, AppError> {
    let customer = state
        .store
        .customer_by_email(&query.email)
        .await?
        .ok_or_else(|| AppError::CustomerNotFound(query.email.clone()))?;

    Ok(Json(customer))
}

/// Forward an email lookup to the customer directory.
///
/// Only routed when a directory is configured.
pub async fn directory_lookup(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = state.directory.as_ref().ok_or_else(|| AppError::Upstream {
        status: None,
        message: "Customer directory is not configured".to_string(),
    })?;

    Ok(Json(directory.lookup(&query.email).await?))
}
