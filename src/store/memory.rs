//! Process-local implementation of [`Store`].
//!
//! Used for `STORE_BACKEND=memory` runs and by the test suite. All tables sit
//! behind one async mutex, which also serves as the ledger lock for
//! transaction inserts.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::Store;
use crate::{
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

#[derive(Debug, Default)]
struct Tables {
    partners: Vec<Partner>,
    availability: Vec<ProviderAvailability>,
    appointments: Vec<Appointment>,
    customers: Vec<Customer>,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory store. Identifiers are assigned from a single counter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

struct MemoryLedger<'a> {
    tables: &'a mut Tables,
}

#[async_trait]
impl LedgerScope for MemoryLedger<'_> {
    async fn transactions_for_account(
        &mut self,
        account_id: i64,
    ) -> Result<Vec<Transaction>, AppError> {
        Ok(self
            .tables
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn write_balance(&mut self, account_id: i64, balance: Decimal) -> Result<(), AppError> {
        if let Some(account) = self.tables.accounts.iter_mut().find(|a| a.id == account_id) {
            account.balance = balance;
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer row; `id` and `created_at` are assigned here.
    pub async fn insert_customer(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> Customer {
        let mut tables = self.tables.lock().await;
        let customer = Customer {
            id: tables.next_id(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.customers.push(customer.clone());
        customer
    }

    pub async fn insert_partner(
        &self,
        provider_number: i64,
        name: &str,
        specialty: Option<&str>,
    ) -> Partner {
        let mut tables = self.tables.lock().await;
        let partner = Partner {
            id: tables.next_id(),
            provider_number,
            name: name.to_string(),
            specialty: specialty.map(str::to_string),
            email: None,
        };
        tables.partners.push(partner.clone());
        partner
    }

    pub async fn insert_availability(
        &self,
        provider_number: i64,
        date: NaiveDate,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
    ) -> ProviderAvailability {
        let mut tables = self.tables.lock().await;
        let row = ProviderAvailability {
            id: tables.next_id(),
            provider_number,
            provider_availability_date: date,
            start_time,
            end_time,
        };
        tables.availability.push(row.clone());
        row
    }

    /// Book an appointment; reminders start unsent.
    pub async fn insert_appointment(
        &self,
        provider_number: i64,
        starts_at: NaiveDateTime,
        patient_name: &str,
        patient_email: &str,
    ) -> Appointment {
        let mut tables = self.tables.lock().await;
        let appointment = Appointment {
            id: tables.next_id(),
            provider_number,
            appointment_date: starts_at.date(),
            appointment_time: starts_at.time(),
            patient_name: patient_name.to_string(),
            patient_email: patient_email.to_string(),
            reminder_sent: false,
        };
        tables.appointments.push(appointment.clone());
        appointment
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_partners(&self) -> Result<Vec<Partner>, AppError> {
        Ok(self.tables.lock().await.partners.clone())
    }

    async fn provider_availability(
        &self,
        provider_number: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ProviderAvailability>, AppError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .availability
            .iter()
            .filter(|a| a.provider_number == provider_number)
            .filter(|a| date.is_none_or(|d| a.provider_availability_date == d))
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.provider_availability_date, a.start_time));
        Ok(rows)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let mut appointments = self.tables.lock().await.appointments.clone();
        appointments.sort_by_key(|a| (a.starts_at(), a.id));
        Ok(appointments)
    }

    async fn booked_slots(&self) -> Result<Vec<BookedSlot>, AppError> {
        Ok(self
            .list_appointments()
            .await?
            .into_iter()
            .map(|a| BookedSlot {
                provider_number: a.provider_number,
                appointment_date: a.appointment_date,
                appointment_time: a.appointment_time,
            })
            .collect())
    }

    async fn booked_times(
        &self,
        provider_number: i64,
        date: NaiveDate,
    ) -> Result<Vec<BookedTime>, AppError> {
        Ok(self
            .list_appointments()
            .await?
            .into_iter()
            .filter(|a| a.provider_number == provider_number && a.appointment_date == date)
            .map(|a| BookedTime {
                appointment_time: a.appointment_time,
            })
            .collect())
    }

    async fn appointments_due(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<DueAppointment>, AppError> {
        let tables = self.tables.lock().await;
        let mut due: Vec<_> = tables
            .appointments
            .iter()
            .filter(|a| !a.reminder_sent && a.starts_at() >= from && a.starts_at() < to)
            .map(|a| DueAppointment {
                id: a.id,
                patient_name: a.patient_name.clone(),
                patient_email: a.patient_email.clone(),
                appointment_date: a.appointment_date,
                appointment_time: a.appointment_time,
                partner_name: tables
                    .partners
                    .iter()
                    .find(|p| p.provider_number == a.provider_number)
                    .map(|p| p.name.clone()),
            })
            .collect();
        due.sort_by_key(|a| a.appointment_date.and_time(a.appointment_time));
        Ok(due)
    }

    async fn mark_reminder_sent(&self, appointment_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        if let Some(appointment) = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
        {
            appointment.reminder_sent = true;
        }
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.tables.lock().await.customers.clone())
    }

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .customers
            .iter()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_accounts(&self, customer_id: Option<i64>) -> Result<Vec<Account>, AppError> {
        let tables = self.tables.lock().await;
        let mut accounts: Vec<_> = tables
            .accounts
            .iter()
            .filter(|a| customer_id.is_none() || a.customer_id == customer_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(accounts)
    }

    async fn get_account(&self, account_id: i64) -> Result<Option<Account>, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .cloned())
    }

    async fn create_account(&self, request: CreateAccountRequest) -> Result<Account, AppError> {
        let mut tables = self.tables.lock().await;
        let account = Account {
            id: tables.next_id(),
            customer_id: request.customer_id,
            account_name: request.account_name,
            account_number: request.account_number,
            product_id: request.product_id,
            currency: request.currency,
            created_at: Utc::now(),
            balance: Decimal::ZERO,
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn list_transactions(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<Transaction>, AppError> {
        let tables = self.tables.lock().await;
        let mut transactions: Vec<_> = tables
            .transactions
            .iter()
            .filter(|t| account_id.is_none_or(|id| t.account_id == id))
            .cloned()
            .collect();
        newest_first(&mut transactions);
        Ok(transactions)
    }

    async fn budget_transactions(
        &self,
        filter: &BudgetFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let tables = self.tables.lock().await;
        let mut transactions: Vec<_> = tables
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        newest_first(&mut transactions);
        Ok(transactions)
    }

    async fn record_transaction(
        &self,
        new: NewTransaction,
    ) -> Result<RecordedTransaction, AppError> {
        let mut tables = self.tables.lock().await;

        if !tables.accounts.iter().any(|a| a.id == new.account_id) {
            return Err(AppError::AccountNotFound(new.account_id));
        }

        let transaction = Transaction {
            id: tables.next_id(),
            debit_account_id: new.debit_account_id,
            credit_account_id: new.credit_account_id,
            debit_amount: new.debit_amount,
            credit_amount: new.credit_amount,
            currency: new.currency,
            transaction_type: new.transaction_type,
            transaction_time: new.transaction_time.unwrap_or_else(Utc::now),
            account_id: new.account_id,
            customer_id: new.customer_id,
        };
        let previous_balance = balance_of(&tables, transaction.account_id);
        tables.transactions.push(transaction.clone());

        let recomputed = {
            let mut ledger = MemoryLedger {
                tables: &mut *tables,
            };
            balance::recompute(&mut ledger, transaction.account_id).await
        };

        match recomputed {
            Ok(account_balance) => Ok(RecordedTransaction {
                transaction,
                account_balance,
            }),
            Err(err) => {
                // Roll back: drop the row and restore the cached balance
                tables.transactions.retain(|t| t.id != transaction.id);
                if let Some(account) = tables
                    .accounts
                    .iter_mut()
                    .find(|a| a.id == transaction.account_id)
                {
                    account.balance = previous_balance;
                }
                tracing::warn!(
                    account_id = transaction.account_id,
                    error = %err,
                    "transaction insert rolled back"
                );
                Err(err)
            }
        }
    }
}

fn balance_of(tables: &Tables, account_id: i64) -> Decimal {
    tables
        .accounts
        .iter()
        .find(|a| a.id == account_id)
        .map(|a| a.balance)
        .unwrap_or_default()
}

fn newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.transaction_time
            .cmp(&a.transaction_time)
            .then(b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account_request(name: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            account_name: name.to_string(),
            account_number: 1001,
            product_id: "CHECKING".to_string(),
            currency: "USD".to_string(),
            customer_id: None,
        }
    }

    fn credit(account_id: i64, amount: Decimal) -> NewTransaction {
        NewTransaction {
            account_id,
            debit_account_id: None,
            credit_account_id: Some(account_id),
            debit_amount: None,
            credit_amount: Some(amount),
            currency: "USD".to_string(),
            transaction_type: "deposit".to_string(),
            transaction_time: None,
            customer_id: None,
        }
    }

    fn debit(account_id: i64, amount: Decimal) -> NewTransaction {
        NewTransaction {
            debit_account_id: Some(account_id),
            credit_account_id: None,
            debit_amount: Some(amount),
            credit_amount: None,
            transaction_type: "groceries".to_string(),
            ..credit(account_id, Decimal::ZERO)
        }
    }

    #[tokio::test]
    async fn new_account_starts_at_zero() {
        let store = MemoryStore::new();
        let account = store.create_account(account_request("Checking")).await.unwrap();
        assert_eq!(account.balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn credit_then_debit_updates_cached_balance() {
        let store = MemoryStore::new();
        let account = store.create_account(account_request("Checking")).await.unwrap();

        let first = store
            .record_transaction(credit(account.id, dec!(100)))
            .await
            .unwrap();
        assert_eq!(first.account_balance, dec!(100));

        let second = store
            .record_transaction(debit(account.id, dec!(30)))
            .await
            .unwrap();
        assert_eq!(second.account_balance, dec!(70));

        let stored = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, dec!(70));
    }

    #[tokio::test]
    async fn balances_are_per_account() {
        let store = MemoryStore::new();
        let a = store.create_account(account_request("A")).await.unwrap();
        let b = store.create_account(account_request("B")).await.unwrap();

        store.record_transaction(credit(a.id, dec!(10))).await.unwrap();
        store.record_transaction(credit(b.id, dec!(25))).await.unwrap();

        assert_eq!(store.get_account(a.id).await.unwrap().unwrap().balance, dec!(10));
        assert_eq!(store.get_account(b.id).await.unwrap().unwrap().balance, dec!(25));
    }

    #[tokio::test]
    async fn unknown_account_is_rejected_without_insert() {
        let store = MemoryStore::new();
        let err = store.record_transaction(credit(99, dec!(1))).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound(99)));
        assert!(store.list_transactions(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_recompute_leaves_no_row() {
        let store = MemoryStore::new();
        let account = store.create_account(account_request("Savings")).await.unwrap();

        store
            .record_transaction(credit(account.id, dec!(999999999999999)))
            .await
            .unwrap();

        let err = store
            .record_transaction(credit(account.id, dec!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        assert_eq!(store.list_transactions(Some(account.id)).await.unwrap().len(), 1);
        let stored = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(stored.balance, dec!(999999999999999));

        let after = store
            .record_transaction(debit(account.id, dec!(0.5)))
            .await
            .unwrap();
        assert_eq!(after.account_balance, dec!(999999999999998.5));
    }

    #[tokio::test]
    async fn huge_credits_do_not_poison_the_account() {
        let store = MemoryStore::new();
        let account = store.create_account(account_request("Checking")).await.unwrap();

        for _ in 0..2 {
            let err = store
                .record_transaction(credit(account.id, dec!(70000000000000000000000000000)))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
        assert!(store.list_transactions(Some(account.id)).await.unwrap().is_empty());

        let later = store
            .record_transaction(credit(account.id, dec!(1)))
            .await
            .unwrap();
        assert_eq!(later.account_balance, dec!(1));
    }

    #[tokio::test]
    async fn concurrent_inserts_keep_balance_exact() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let account_id = store
            .create_account(account_request("Shared"))
            .await
            .unwrap()
            .id;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let request = if i % 2 == 0 {
                        credit(account_id, dec!(10))
                    } else {
                        debit(account_id, dec!(3))
                    };
                    store.record_transaction(request).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.get_account(account_id).await.unwrap().unwrap();
        assert_eq!(stored.balance, dec!(70));
    }

    #[tokio::test]
    async fn customer_lookup_ignores_case() {
        let store = MemoryStore::new();
        store
            .insert_customer("Ada", "Lovelace", "ada@example.com", None)
            .await;

        let found = store.customer_by_email("ADA@example.com").await.unwrap();
        assert_eq!(found.unwrap().first_name, "Ada");
        assert!(store.customer_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
