//! Access to the relational store.
//!
//! Handlers talk to the store through the [`Store`] trait so the same router
//! runs against Postgres in production and against process-local tables in
//! local runs and tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    error::AppError,
    models::{
        account::{Account, CreateAccountRequest},
        appointment::{Appointment, BookedSlot, BookedTime, DueAppointment},
        customer::Customer,
        partner::{Partner, ProviderAvailability},
        transaction::{BudgetFilter, NewTransaction, RecordedTransaction, Transaction},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Filtered reads and inserts over the application's tables.
///
/// Every method maps to a single query, except [`Store::record_transaction`],
/// which inserts and recomputes the owning account's balance atomically.
#[async_trait]
pub trait Store: Send + Sync {
    /// Round-trip to the backend to prove it is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError>;

    /// Availability rows for a provider, optionally restricted to one date.
    async fn provider_availability(
        &self,
        provider_number: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ProviderAvailability>, AppError>;

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError>;

    async fn booked_slots(&self) -> Result<Vec<BookedSlot>, AppError>;

    async fn booked_times(
        &self,
        provider_number: i64,
        date: NaiveDate,
    ) -> Result<Vec<BookedTime>, AppError>;

    /// Appointments starting in `[from, to)` that have not been reminded yet.
    async fn appointments_due(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DueAppointment>, AppError>;

    async fn mark_reminder_sent(&self, appointment_id: i64) -> Result<(), AppError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;

    /// Accounts, newest first, optionally only those of one customer.
    async fn list_accounts(&self, customer_id: Option<i64>) -> Result<Vec<Account>, AppError>;

    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, AppError>;

    /// Insert an account with a zero balance.
    async fn create_account(&self, request: CreateAccountRequest) -> Result<Account, AppError>;

    /// Transactions, newest first, optionally only those of one account.
    async fn list_transactions(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>, AppError>;

    /// Debit transactions selected by a budget filter, newest first.
    async fn budget_transactions(
        &self,
        filter: &BudgetFilter,
    ) -> Result<Vec<Transaction>, AppError>;

    /// Insert a transaction and recompute its account's balance in one unit.
    ///
    /// Either both the row and the new balance are stored, or neither is.
    async fn record_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<RecordedTransaction, AppError>;
}
