//! Shared state handed to every handler.

use std::sync::Arc;

use crate::{
    config::{Config, StoreBackend},
    db,
    services::{
        customer_directory::CustomerDirectory,
        mail_service::{LogMailer, Mailer, SmtpMailer},
        reminder_service::ReminderClaims,
    },
    store::{MemoryStore, PgStore, Store},
};

/// Dependencies built once at startup and cloned into each request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,

    /// Appointments owned by a running reminder delivery
    pub reminders: ReminderClaims,

    /// Present only when `CUSTOMER_DIRECTORY_URL` is configured
    pub directory: Option<CustomerDirectory>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            mailer,
            reminders: ReminderClaims::default(),
            directory: None,
        }
    }

    pub fn with_directory(mut self, directory: CustomerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Build the state described by `config`.
    ///
    /// For the postgres backend this connects the pool and applies pending
    /// migrations.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn Store> = match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;

                let pool = db::create_pool(database_url, config.database_max_connections).await?;
                tracing::info!("Database pool created");

                db::run_migrations(&pool).await?;
                tracing::info!("Database migrations complete");

                Arc::new(PgStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let mailer: Arc<dyn Mailer> = match config.smtp() {
            Some(settings) => {
                tracing::info!(host = %settings.host, port = settings.port, "SMTP relay configured");
                Arc::new(SmtpMailer::new(&settings)?)
            }
            None => {
                tracing::warn!("SMTP credentials missing; reminder mails will only be logged");
                Arc::new(LogMailer)
            }
        };

        let mut state = Self::new(store, mailer);

        if let Some(url) = config.directory_url()? {
            state = state.with_directory(CustomerDirectory::new(
                url,
                config.customer_directory_api_key.clone(),
            )?);
            tracing::info!("Customer directory proxy enabled");
        }

        Ok(state)
    }
}
