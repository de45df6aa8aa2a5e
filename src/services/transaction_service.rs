//! Transaction service - business logic around account transactions.
//!
//! This service handles:
//! - Request validation before anything reaches the store
//! - Recording a transaction together with its account's new balance
//! - Budget summaries over debit transactions

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::transaction::{NewTransaction, RecordedTransaction, SpendingByType, Transaction},
    store::Store,
};

/// Record a transaction and recompute the owning account's balance.
///
/// # Process
///
/// 1. Validate the request
/// 2. Insert the row and recompute the balance in one store unit
///
/// # Errors
///
/// - `InvalidRequest`: amounts, type tag or currency are malformed
/// - `AccountNotFound`: the owning account does not exist
/// - `Database` / `Store`: the store failed; nothing was written
pub async fn record_transaction(
    store: &dyn Store,
    request: NewTransaction,
) -> Result<RecordedTransaction, AppError> {
    request.validate()?;

    let recorded = store.record_transaction(request).await?;

    tracing::info!(
        transaction_id = recorded.transaction.id,
        account_id = recorded.transaction.account_id,
        balance = %recorded.account_balance,
        "transaction recorded"
    );

    Ok(recorded)
}

/// Sum debit amounts per type tag, ordered by tag.
///
/// # Errors
///
/// `InvalidRequest` if a tag's total leaves the range of `Decimal`.
pub fn summarize_spending(transactions: &[Transaction]) -> Result<Vec<SpendingByType>, AppError> {
    let mut totals: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();

    for tx in transactions {
        let Some(debit) = tx.debit_amount else {
            continue;
        };
        let entry = totals
            .entry(tx.transaction_type.as_str())
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.checked_add(debit).ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "spending total for {:?} is out of range; narrow the filter",
                tx.transaction_type
            ))
        })?;
        entry.1 += 1;
    }

    Ok(totals
        .into_iter()
        .map(|(transaction_type, (spent, transaction_count))| SpendingByType {
            transaction_type: transaction_type.to_string(),
            spent,
            transaction_count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::account::CreateAccountRequest, store::MemoryStore};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn request(account_id: i64, credit: Option<Decimal>, debit: Option<Decimal>) -> NewTransaction {
        NewTransaction {
            account_id,
            debit_account_id: None,
            credit_account_id: None,
            debit_amount: debit,
            credit_amount: credit,
            currency: "USD".to_string(),
            transaction_type: "misc".to_string(),
            transaction_time: None,
            customer_id: None,
        }
    }

    async fn store_with_account() -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let account = store
            .create_account(CreateAccountRequest {
                account_name: "Checking".to_string(),
                account_number: 42,
                product_id: "CHECKING".to_string(),
                currency: "USD".to_string(),
                customer_id: None,
            })
            .await
            .unwrap();
        (store, account.id)
    }

    #[tokio::test]
    async fn credit_100_then_debit_30_leaves_70() {
        let (store, account_id) = store_with_account().await;

        let first = record_transaction(&store, request(account_id, Some(dec!(100)), None))
            .await
            .unwrap();
        assert_eq!(first.account_balance, dec!(100));

        let second = record_transaction(&store, request(account_id, None, Some(dec!(30))))
            .await
            .unwrap();
        assert_eq!(second.account_balance, dec!(70));
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_store() {
        let (store, account_id) = store_with_account().await;

        let err = record_transaction(&store, request(account_id, Some(dec!(1)), Some(dec!(1))))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(store.list_transactions(Some(account_id)).await.unwrap().is_empty());
    }

    #[test]
    fn spending_is_grouped_by_type() {
        let tx = |kind: &str, debit: Option<Decimal>, credit: Option<Decimal>| Transaction {
            id: 0,
            debit_account_id: None,
            credit_account_id: None,
            debit_amount: debit,
            credit_amount: credit,
            currency: "USD".to_string(),
            transaction_type: kind.to_string(),
            transaction_time: Utc::now(),
            account_id: 1,
            customer_id: None,
        };

        let summary = summarize_spending(&[
            tx("rent", Some(dec!(1200)), None),
            tx("food", Some(dec!(40.5)), None),
            tx("food", Some(dec!(9.5)), None),
            tx("salary", None, Some(dec!(3000))),
        ])
        .unwrap();

        assert_eq!(
            summary,
            vec![
                SpendingByType {
                    transaction_type: "food".to_string(),
                    spent: dec!(50.0),
                    transaction_count: 2,
                },
                SpendingByType {
                    transaction_type: "rent".to_string(),
                    spent: dec!(1200),
                    transaction_count: 1,
                },
            ]
        );
    }

    #[test]
    fn spending_overflow_is_an_error() {
        let debit = |amount| Transaction {
            id: 0,
            debit_account_id: None,
            credit_account_id: None,
            debit_amount: Some(amount),
            credit_amount: None,
            currency: "USD".to_string(),
            transaction_type: "rent".to_string(),
            transaction_time: Utc::now(),
            account_id: 1,
            customer_id: None,
        };

        let err = summarize_spending(&[debit(Decimal::MAX), debit(dec!(1))]).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_before_the_store() {
        let (store, account_id) = store_with_account().await;

        let err = record_transaction(
            &store,
            request(account_id, Some(dec!(70000000000000000000000000000)), None),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(store.list_transactions(Some(account_id)).await.unwrap().is_empty());
    }
}
