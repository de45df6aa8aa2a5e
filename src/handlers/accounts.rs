//! Account HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /accounts - Create new account
//! - GET /accounts/{id} - Get account by ID
//! - GET /accounts - List accounts, optionally for one customer

use crate::{
    error::AppError,
    extract::{Json, Path, Query},
    models::account::{Account, AccountQuery, CreateAccountRequest},
    state::AppState,
};
use axum::{extract::State, http::StatusCode};

/// Create a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "account_name": "Checking",
///   "account_number": 12345678,
///   "currency": "USD"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the created account, balance 0
/// - **Error (400)**: blank account name or malformed currency
/// - **Error (500)**: store failure
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    request.validate()?;

    let account = state.store.create_account(request).await?;
    tracing::info!(account_id = account.id, "account created");

    Ok((StatusCode::CREATED, Json(account)))
}

/// Get a specific account by ID.
///
/// # Response
///
/// - **Success (200 OK)**: account details including cached balance
/// - **Error (404)**: account not found
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .store
        .get_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound(account_id))?;

    Ok(Json(account))
}

/// List accounts, newest first.
///
/// `?customer_id=` narrows the list to one customer's accounts.
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.store.list_accounts(query.customer_id).await?))
}
