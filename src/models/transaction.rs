//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `Transaction`: Database entity representing a transaction
//! - `NewTransaction`: Request body for inserting a transaction
//! - `RecordedTransaction`: Inserted row plus the recomputed account balance
//! - `BudgetFilter` / `SpendingByType`: budget view over debit transactions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::account::validate_currency};

/// Integer digits an amount or balance column holds (`NUMERIC(19,4)`).
pub const LEDGER_INTEGER_DIGITS: u32 = 15;

/// Decimal places an amount or balance column holds.
pub const LEDGER_SCALE: u32 = 4;

/// Whether `value` can be stored in an amount or balance column unchanged.
pub fn fits_ledger(value: Decimal) -> bool {
    value.abs() < Decimal::from(10_i64.pow(LEDGER_INTEGER_DIGITS))
        && value.normalize().scale() <= LEDGER_SCALE
}

/// Represents a transaction record from the `transactions` table.
///
/// A transaction carries either a credit amount or a debit amount. Rows are
/// immutable once inserted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: i64,

    /// Account the money was taken from, if recorded
    pub debit_account_id: Option<i64>,

    /// Account the money was paid into, if recorded
    pub credit_account_id: Option<i64>,

    /// Amount removed from the owning account
    pub debit_amount: Option<Decimal>,

    /// Amount added to the owning account
    pub credit_amount: Option<Decimal>,

    /// Currency code (ISO 4217)
    pub currency: String,

    /// Free-form type tag ("groceries", "salary", ...)
    pub transaction_type: String,

    /// When the transaction happened
    pub transaction_time: DateTime<Utc>,

    /// Account whose balance this transaction contributes to
    pub account_id: i64,

    /// Customer that owns the transaction, if known
    pub customer_id: Option<i64>,
}

/// Request body for `POST /transactions`.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_id": 1,
///   "credit_amount": 100.0,
///   "transaction_type": "salary"
/// }
/// ```
///
/// # Validation
///
/// - Exactly one of `debit_amount` / `credit_amount` must be set
/// - Amounts must not be negative and must fit `NUMERIC(19,4)`
/// - `transaction_type` must not be blank
/// - `currency` must be a three-letter code (defaults to "USD")
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub account_id: i64,

    #[serde(default)]
    pub debit_account_id: Option<i64>,

    #[serde(default)]
    pub credit_account_id: Option<i64>,

    #[serde(default)]
    pub debit_amount: Option<Decimal>,

    #[serde(default)]
    pub credit_amount: Option<Decimal>,

    #[serde(default = "crate::models::account::default_currency")]
    pub currency: String,

    pub transaction_type: String,

    /// Defaults to the time of insertion
    #[serde(default)]
    pub transaction_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub customer_id: Option<i64>,
}

impl NewTransaction {
    /// Check the request before it reaches the store.
    pub fn validate(&self) -> Result<(), AppError> {
        match (self.debit_amount, self.credit_amount) {
            (Some(_), Some(_)) => {
                return Err(AppError::InvalidRequest(
                    "debit_amount and credit_amount are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(AppError::InvalidRequest(
                    "one of debit_amount or credit_amount is required".to_string(),
                ));
            }
            (Some(amount), None) | (None, Some(amount)) if amount.is_sign_negative() => {
                return Err(AppError::InvalidRequest(
                    "amount must not be negative".to_string(),
                ));
            }
            (Some(amount), None) | (None, Some(amount)) if !fits_ledger(amount) => {
                return Err(AppError::InvalidRequest(format!(
                    "amount must have at most {} integer digits and {} decimal places",
                    LEDGER_INTEGER_DIGITS, LEDGER_SCALE
                )));
            }
            _ => {}
        }

        if self.transaction_type.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "transaction_type is required".to_string(),
            ));
        }

        validate_currency(&self.currency)
    }
}

/// Result of inserting a transaction: the stored row and the balance the
/// owning account holds afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    pub account_balance: Decimal,
}

/// Query string for `GET /transactions`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub account_id: Option<i64>,
}

/// Query string for the budget endpoints.
///
/// Selects debit transactions of one account, optionally narrowed to a type
/// tag and a `[from, to)` time window.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetFilter {
    pub account_id: i64,

    #[serde(default)]
    pub transaction_type: Option<String>,

    #[serde(default)]
    pub from: Option<DateTime<Utc>>,

    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl BudgetFilter {
    /// Whether a transaction belongs in the budget view.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction.account_id == self.account_id
            && transaction.debit_amount.is_some()
            && self
                .transaction_type
                .as_deref()
                .is_none_or(|t| t == transaction.transaction_type)
            && self.from.is_none_or(|from| transaction.transaction_time >= from)
            && self.to.is_none_or(|to| transaction.transaction_time < to)
    }
}

/// Total debited per type tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingByType {
    pub transaction_type: String,
    pub spent: Decimal,
    pub transaction_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn request(debit: Option<Decimal>, credit: Option<Decimal>) -> NewTransaction {
        NewTransaction {
            account_id: 1,
            debit_account_id: None,
            credit_account_id: None,
            debit_amount: debit,
            credit_amount: credit,
            currency: "USD".to_string(),
            transaction_type: "groceries".to_string(),
            transaction_time: None,
            customer_id: None,
        }
    }

    #[test]
    fn exactly_one_amount_is_accepted() {
        assert!(request(Some(dec!(5)), None).validate().is_ok());
        assert!(request(None, Some(dec!(5))).validate().is_ok());
        assert!(request(None, Some(dec!(0))).validate().is_ok());
        assert!(matches!(
            request(Some(dec!(5)), Some(dec!(5))).validate(),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            request(None, None).validate(),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn negative_amounts_and_bad_currency_are_rejected() {
        assert!(request(Some(dec!(-1)), None).validate().is_err());

        let mut req = request(None, Some(dec!(1)));
        req.currency = "US".to_string();
        assert!(req.validate().is_err());

        let mut req = request(None, Some(dec!(1)));
        req.transaction_type = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn amounts_outside_the_ledger_column_are_rejected() {
        assert!(request(None, Some(dec!(999999999999999.9999))).validate().is_ok());
        assert!(request(None, Some(dec!(1.50000))).validate().is_ok());

        for amount in [dec!(1000000000000000), dec!(70000000000000000000000000000), dec!(0.00001)] {
            assert!(
                matches!(
                    request(None, Some(amount)).validate(),
                    Err(AppError::InvalidRequest(_))
                ),
                "{} should be rejected",
                amount
            );
        }
        assert!(request(Some(dec!(1.23456)), None).validate().is_err());
    }

    #[test]
    fn request_defaults_currency() {
        let req: NewTransaction =
            serde_json::from_str(r#"{"account_id": 3, "credit_amount": 100, "transaction_type": "salary"}"#)
                .unwrap();
        assert_eq!(req.currency, "USD");
        assert_eq!(req.credit_amount, Some(dec!(100)));
        assert!(req.debit_amount.is_none());
    }

    #[test]
    fn budget_filter_keeps_debits_in_window() {
        let at = |day| Utc.with_ymd_and_hms(2025, 4, day, 12, 0, 0).unwrap();
        let tx = |id, day, debit: Option<Decimal>, credit: Option<Decimal>, kind: &str| Transaction {
            id,
            debit_account_id: None,
            credit_account_id: None,
            debit_amount: debit,
            credit_amount: credit,
            currency: "USD".to_string(),
            transaction_type: kind.to_string(),
            transaction_time: at(day),
            account_id: 7,
            customer_id: None,
        };

        let filter = BudgetFilter {
            account_id: 7,
            transaction_type: Some("groceries".to_string()),
            from: Some(at(10)),
            to: Some(at(20)),
        };

        assert!(filter.matches(&tx(1, 10, Some(dec!(5)), None, "groceries")));
        assert!(!filter.matches(&tx(2, 20, Some(dec!(5)), None, "groceries")));
        assert!(!filter.matches(&tx(3, 15, None, Some(dec!(5)), "groceries")));
        assert!(!filter.matches(&tx(4, 15, Some(dec!(5)), None, "rent")));

        let mut other_account = tx(5, 15, Some(dec!(5)), None, "groceries");
        other_account.account_id = 8;
        assert!(!filter.matches(&other_account));
    }
}
