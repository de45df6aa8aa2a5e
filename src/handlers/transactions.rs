//! Transaction HTTP handlers.
//!
//! This module implements transaction-related API endpoints:
//! - GET /transactions - List transactions, optionally of one account
//! - POST /transactions - Record a transaction and recompute the balance
//! - GET /transactions/budget - Debit transactions matching a budget filter
//! - GET /transactions/budget/summary - Debit totals per type for the same filter

use crate::{
    error::AppError,
    extract::{Json, Query},
    models::transaction::{
        BudgetFilter, NewTransaction, RecordedTransaction, SpendingByType, Transaction,
        TransactionQuery,
    },
    services::transaction_service,
    state::AppState,
};
use axum::{extract::State, http::StatusCode};

/// List transactions, newest first.
///
/// `?account_id=` narrows the list to one account.
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(state.store.list_transactions(query.account_id).await?))
}

/// Record a credit or debit against an account.
///
/// # Request Body
///
/// ```json
/// {
///   "account_id": 1,
///   "debit_amount": 30.0,
///   "transaction_type": "groceries"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": 12,
///   "debit_account_id": null,
///   "credit_account_id": null,
///   "debit_amount": 30.0,
///   "credit_amount": null,
///   "currency": "USD",
///   "transaction_type": "groceries",
///   "transaction_time": "2025-12-21T16:00:00Z",
///   "account_id": 1,
///   "customer_id": null,
///   "account_balance": 70.0
/// }
/// ```
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<NewTransaction>,
) -> Result<(StatusCode, Json<RecordedTransaction>), AppError> {
    let recorded = transaction_service::record_transaction(state.store.as_ref(), request).await?;

    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Debit transactions of one account for budget tracking.
///
/// # Query
///
/// - `account_id` (required)
/// - `transaction_type`: only this type tag
/// - `from` / `to`: RFC 3339 timestamps, `from` inclusive, `to` exclusive
pub async fn budget_transactions(
    State(state): State<AppState>,
    Query(filter): Query<BudgetFilter>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    check_window(&filter)?;
    Ok(Json(state.store.budget_transactions(&filter).await?))
}

/// Debit totals per type tag for the budget filter.
pub async fn budget_summary(
    State(state): State<AppState>,
    Query(filter): Query<BudgetFilter>,
) -> Result<Json<Vec<SpendingByType>>, AppError> {
    check_window(&filter)?;
    let transactions = state.store.budget_transactions(&filter).await?;

    Ok(Json(transaction_service::summarize_spending(&transactions)?))
}

fn check_window(filter: &BudgetFilter) -> Result<(), AppError> {
    match (filter.from, filter.to) {
        (Some(from), Some(to)) if from > to => Err(AppError::InvalidRequest(
            "from must not be after to".to_string(),
        )),
        _ => Ok(()),
    }
}
