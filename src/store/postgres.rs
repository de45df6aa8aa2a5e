//! PostgreSQL implementation of [`Store`].
//!
//! # Atomicity Guarantees
//!
//! Transaction inserts run inside a PostgreSQL transaction that first locks
//! the owning account row, so concurrent inserts against the same account are
//! serialized and the balance written at commit covers every row.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::Postgres;

use super::Store;
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        account::{Account, CreateAccountRequest},
        appointment::{Appointment, BookedSlot, BookedTime, DueAppointment},
        customer::Customer,
        partner::{Partner, ProviderAvailability},
        transaction::{BudgetFilter, NewTransaction, RecordedTransaction, Transaction},
    },
    services::balance::{self, LedgerScope},
};

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Ledger operations bound to an open database transaction.
struct PgLedger<'a> {
    tx: &'a mut sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerScope for PgLedger<'_> {
    async fn transactions_for_account(
        &mut self,
        account_id: i64,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, debit_account_id, credit_account_id, debit_amount, credit_amount,
                   currency, transaction_type, transaction_time, account_id, customer_id
            FROM transactions
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_all(&mut **self.tx)
        .await?;

        Ok(transactions)
    }

    async fn write_balance(&mut self, account_id: i64, balance: Decimal) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(account_id)
            .execute(&mut **self.tx)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        let partners = sqlx::query_as::<_, Partner>(
            "SELECT id, provider_number, name, specialty, email FROM partner ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(partners)
    }

    async fn provider_availability(
        &self,
        provider_number: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ProviderAvailability>, AppError> {
        let rows = sqlx::query_as::<_, ProviderAvailability>(
            r#"
            SELECT id, provider_number, provider_availability_date, start_time, end_time
            FROM provider_availability
            WHERE provider_number = $1
              AND ($2::date IS NULL OR provider_availability_date = $2)
            ORDER BY provider_availability_date, start_time
            "#,
        )
        .bind(provider_number)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, provider_number, appointment_date, appointment_time,
                   patient_name, patient_email, reminder_sent
            FROM appointment
            ORDER BY appointment_date, appointment_time, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn booked_slots(&self) -> Result<Vec<BookedSlot>, AppError> {
        let slots = sqlx::query_as::<_, BookedSlot>(
            r#"
            SELECT provider_number, appointment_date, appointment_time
            FROM appointment
            ORDER BY appointment_date, appointment_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    async fn booked_times(
        &self,
        provider_number: i64,
        date: NaiveDate,
    ) -> Result<Vec<BookedTime>, AppError> {
        let times = sqlx::query_as::<_, BookedTime>(
            r#"
            SELECT appointment_time
            FROM appointment
            WHERE provider_number = $1 AND appointment_date = $2
            ORDER BY appointment_time
            "#,
        )
        .bind(provider_number)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(times)
    }

    async fn appointments_due(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DueAppointment>, AppError> {
        // date + time yields a timestamp without time zone, compared as UTC
        let due = sqlx::query_as::<_, DueAppointment>(
            r#"
            SELECT a.id, a.patient_name, a.patient_email, a.appointment_date,
                   a.appointment_time, p.name AS partner_name
            FROM appointment a
            LEFT JOIN partner p ON p.provider_number = a.provider_number
            WHERE a.reminder_sent = false
              AND (a.appointment_date + a.appointment_time) >= $1
              AND (a.appointment_date + a.appointment_time) < $2
            ORDER BY a.appointment_date, a.appointment_time
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(due)
    }

    async fn mark_reminder_sent(&self, appointment_id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE appointment SET reminder_sent = true WHERE id = $1")
            .bind(appointment_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, email, phone, created_at
            FROM customers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, first_name, last_name, email, phone, created_at
            FROM customers
            WHERE lower(email) = lower($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn list_accounts(&self, customer_id: Option<i64>) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, customer_id, account_name, account_number, product_id,
                   currency, created_at, balance
            FROM accounts
            WHERE ($1::bigint IS NULL OR customer_id = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, customer_id, account_name, account_number, product_id,
                   currency, created_at, balance
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create_account(&self, request: CreateAccountRequest) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (customer_id, account_name, account_number, product_id, currency, balance)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING id, customer_id, account_name, account_number, product_id,
                      currency, created_at, balance
            "#,
        )
        .bind(request.customer_id)
        .bind(request.account_name)
        .bind(request.account_number)
        .bind(request.product_id)
        .bind(request.currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_transactions(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, debit_account_id, credit_account_id, debit_amount, credit_amount,
                   currency, transaction_type, transaction_time, account_id, customer_id
            FROM transactions
            WHERE ($1::bigint IS NULL OR account_id = $1)
            ORDER BY transaction_time DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn budget_transactions(
        &self,
        filter: &BudgetFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, debit_account_id, credit_account_id, debit_amount, credit_amount,
                   currency, transaction_type, transaction_time, account_id, customer_id
            FROM transactions
            WHERE account_id = $1
              AND debit_amount IS NOT NULL
              AND ($2::text IS NULL OR transaction_type = $2)
              AND ($3::timestamptz IS NULL OR transaction_time >= $3)
              AND ($4::timestamptz IS NULL OR transaction_time < $4)
            ORDER BY transaction_time DESC, id DESC
            "#,
        )
        .bind(filter.account_id)
        .bind(filter.transaction_type.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn record_transaction(
        &self,
        new: NewTransaction,
    ) -> Result<RecordedTransaction, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock the account row; concurrent inserts for this account wait here
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(new.account_id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Err(AppError::AccountNotFound(new.account_id));
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                debit_account_id,
                credit_account_id,
                debit_amount,
                credit_amount,
                currency,
                transaction_type,
                transaction_time,
                account_id,
                customer_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()), $8, $9)
            RETURNING id, debit_account_id, credit_account_id, debit_amount, credit_amount,
                      currency, transaction_type, transaction_time, account_id, customer_id
            "#,
        )
        .bind(new.debit_account_id)
        .bind(new.credit_account_id)
        .bind(new.debit_amount)
        .bind(new.credit_amount)
        .bind(&new.currency)
        .bind(&new.transaction_type)
        .bind(new.transaction_time)
        .bind(new.account_id)
        .bind(new.customer_id)
        .fetch_one(&mut *tx)
        .await?;

        let account_balance = {
            let mut ledger = PgLedger { tx: &mut tx };
            balance::recompute(&mut ledger, transaction.account_id).await?
        };

        // Insert and balance become visible together
        tx.commit().await?;

        Ok(RecordedTransaction {
            transaction,
            account_balance,
        })
    }
}
