//! `PgStore` against a real database.
//!
//! These tests need a PostgreSQL server: set `DATABASE_URL` and run
//! `cargo test -- --ignored`. `sqlx::test` creates a fresh database per test
//! and applies `./migrations`.

use banking_api_server::{
    error::AppError,
    models::{account::CreateAccountRequest, transaction::NewTransaction},
    store::{PgStore, Store},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;

async fn store_with_account(pool: PgPool) -> (PgStore, i64) {
    let store = PgStore::new(pool);
    let account = store
        .create_account(CreateAccountRequest {
            account_name: "Checking".to_string(),
            account_number: 12345678,
            product_id: "CHECKING".to_string(),
            currency: "USD".to_string(),
            customer_id: None,
        })
        .await
        .unwrap();
    (store, account.id)
}

fn entry(account_id: i64, credit: Option<Decimal>, debit: Option<Decimal>) -> NewTransaction {
    NewTransaction {
        account_id,
        debit_account_id: debit.map(|_| account_id),
        credit_account_id: credit.map(|_| account_id),
        debit_amount: debit,
        credit_amount: credit,
        currency: "USD".to_string(),
        transaction_type: "misc".to_string(),
        transaction_time: None,
        customer_id: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn credit_then_debit_commits_balance(pool: PgPool) {
    let (store, account_id) = store_with_account(pool).await;

    let first = store
        .record_transaction(entry(account_id, Some(dec!(100)), None))
        .await
        .unwrap();
    assert_eq!(first.account_balance, dec!(100));

    let second = store
        .record_transaction(entry(account_id, None, Some(dec!(30))))
        .await
        .unwrap();
    assert_eq!(second.account_balance, dec!(70));

    let account = store.get_account(account_id).await.unwrap().unwrap();
    assert_eq!(account.balance, dec!(70));
    assert_eq!(store.list_transactions(Some(account_id)).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn unknown_account_inserts_nothing(pool: PgPool) {
    let store = PgStore::new(pool);

    let err = store
        .record_transaction(entry(404, Some(dec!(5)), None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(404)));
    assert!(store.list_transactions(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn failed_recompute_rolls_back_insert(pool: PgPool) {
    let (store, account_id) = store_with_account(pool).await;

    store
        .record_transaction(entry(account_id, Some(dec!(999999999999999)), None))
        .await
        .unwrap();

    let err = store
        .record_transaction(entry(account_id, Some(dec!(1)), None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidRequest(_)));

    assert_eq!(store.list_transactions(Some(account_id)).await.unwrap().len(), 1);
    let account = store.get_account(account_id).await.unwrap().unwrap();
    assert_eq!(account.balance, dec!(999999999999999));
}
