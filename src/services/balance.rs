//! Balance recalculation.
//!
//! An account's `balance` column is a cache: the sum of every credit minus
//! every debit recorded against the account. It is rebuilt from scratch each
//! time a transaction is inserted, inside the same ledger scope as the insert,
//! so the stored value always reflects the full transaction set at commit.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::transaction::{Transaction, fits_ledger},
};

/// Store operations available while a ledger change is in progress.
///
/// The Postgres store implements this over an open database transaction with
/// the account row locked; the in-memory store implements it while holding
/// its table lock.
#[async_trait]
pub trait LedgerScope: Send {
    /// All transactions whose owning account is `account_id`.
    async fn transactions_for_account(
        &mut self,
        account_id: i64,
    ) -> Result<Vec<Transaction>, AppError>;

    /// Overwrite the cached balance of `account_id`.
    async fn write_balance(&mut self, account_id: i64, balance: Decimal) -> Result<(), AppError>;
}

/// Fold transactions into a signed balance.
///
/// Missing amounts count as zero. Addition is commutative, so the order of
/// `transactions` does not matter. Returns `None` if the running total leaves
/// the range of `Decimal`.
pub fn fold_balance<'a, I>(transactions: I) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions.into_iter().try_fold(Decimal::ZERO, |balance, tx| {
        balance
            .checked_add(tx.credit_amount.unwrap_or_default())?
            .checked_sub(tx.debit_amount.unwrap_or_default())
    })
}

/// Recompute and persist the balance of `account_id`.
///
/// The account is not checked for existence: no transactions yields zero.
///
/// # Errors
///
/// - `InvalidRequest`: the balance would not fit the balance column; nothing
///   is written
/// - any read or write failure from the scope, unchanged
pub async fn recompute(scope: &mut dyn LedgerScope, account_id: i64) -> Result<Decimal, AppError> {
    let transactions = scope.transactions_for_account(account_id).await?;
    let balance = fold_balance(&transactions)
        .filter(|balance| fits_ledger(*balance))
        .ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "balance of account {} would exceed the supported range",
                account_id
            ))
        })?;

    scope.write_balance(account_id, balance).await?;

    tracing::debug!(
        account_id,
        %balance,
        transactions = transactions.len(),
        "account balance recomputed"
    );

    Ok(balance)
}
