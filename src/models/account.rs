//! Account data models and API request types.
//!
//! This module defines:
//! - `Account`: Database entity representing an account
//! - `CreateAccountRequest`: Request body for creating accounts
//! - `AccountQuery`: Query string for listing accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Represents an account record from the `accounts` table.
///
/// # Balance
///
/// `balance` is a cache derived from the account's transactions. It is only
/// written by the balance recalculator when a transaction is inserted; nothing
/// else mutates it.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: i64,

    /// Owning customer, when the account is linked to one
    pub customer_id: Option<i64>,

    /// Human-readable name for this account
    pub account_name: String,

    /// Bank account number shown to the customer
    pub account_number: i64,

    /// Banking product this account belongs to
    pub product_id: String,

    /// Currency code (ISO 4217, 3 letters)
    pub currency: String,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Net of all credits minus all debits recorded against this account
    pub balance: Decimal,
}

/// Request body for creating a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_name": "Checking",
///   "account_number": 12345678,
///   "product_id": "CHECKING",
///   "currency": "USD"
/// }
/// ```
///
/// New accounts always start with a zero balance.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub account_name: String,

    pub account_number: i64,

    #[serde(default = "default_product")]
    pub product_id: String,

    /// Currency code (defaults to "USD" if not provided)
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub customer_id: Option<i64>,
}

impl CreateAccountRequest {
    /// Check the request before it reaches the store.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.account_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "account_name is required".to_string(),
            ));
        }

        validate_currency(&self.currency)
    }
}

/// Query string for `GET /accounts`.
#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    pub customer_id: Option<i64>,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

fn default_product() -> String {
    "CHECKING".to_string()
}

/// Currency codes are three ASCII letters (ISO 4217 shape).
pub fn validate_currency(code: &str) -> Result<(), AppError> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::InvalidRequest(format!(
            "currency must be a three-letter code, got {:?}",
            code
        )));
    }
    Ok(())
}
