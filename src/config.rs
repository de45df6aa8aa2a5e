//! Application configuration management.
//!
//! Configuration is loaded once at startup from environment variables and
//! handed to the router as part of the shared state. It uses the `envy` crate
//! to deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Which store implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local tables, for local runs without a database.
    Memory,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required for the postgres backend)
/// - `STORE_BACKEND`: `postgres` (default) or `memory`
/// - `SERVER_PORT`: HTTP server port, defaults to 8000
/// - `DATABASE_MAX_CONNECTIONS`: pool size, defaults to 5
/// - `SMTP_HOST` / `SMTP_PORT`: mail relay, defaults to smtp.gmail.com:465
/// - `SMTP_USERNAME` / `SMTP_PASSWORD`: relay credentials; without them mail is only logged
/// - `MAIL_FROM`: sender address, defaults to `SMTP_USERNAME`
/// - `CUSTOMER_DIRECTORY_URL` / `CUSTOMER_DIRECTORY_API_KEY`: upstream customer lookup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,

    #[serde(default)]
    pub store_backend: StoreBackend,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    pub smtp_username: Option<String>,

    pub smtp_password: Option<String>,

    pub mail_from: Option<String>,

    pub customer_directory_url: Option<String>,

    #[serde(default)]
    pub customer_directory_api_key: String,
}

/// Errors raised while building the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("DATABASE_URL is required when STORE_BACKEND=postgres")]
    MissingDatabaseUrl,

    #[error("CUSTOMER_DIRECTORY_URL is not an absolute URL: {0}")]
    InvalidDirectoryUrl(#[from] url::ParseError),
}

/// Credentials for the SMTP relay, present only when fully configured.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

fn default_port() -> u16 {
    8000
}

fn default_max_connections() -> u32 {
    5
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Attempts to load a `.env` file first (optional), then reads the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment variable values cannot be parsed into expected types
    /// - The postgres backend is selected without a `DATABASE_URL`
    /// - `CUSTOMER_DIRECTORY_URL` is set but not an absolute URL
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        // Field names are converted automatically: database_url -> DATABASE_URL
        envy::from_env::<Config>()?.validated()
    }

    /// Build configuration from explicit key/value pairs (upper-case keys).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(pairs)?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.store_backend == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        self.directory_url()?;
        Ok(self)
    }

    /// Parsed `CUSTOMER_DIRECTORY_URL`, if the directory proxy is configured.
    pub fn directory_url(&self) -> Result<Option<Url>, ConfigError> {
        Ok(self
            .customer_directory_url
            .as_deref()
            .map(Url::parse)
            .transpose()?)
    }

    /// SMTP settings when both username and password are set.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        let username = self.smtp_username.clone()?;
        let password = self.smtp_password.clone()?;
        Some(SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            from: self.mail_from.clone().unwrap_or_else(|| username.clone()),
            username,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_pairs(pairs(&[("DATABASE_URL", "postgres://localhost/bank")]))
            .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert!(config.smtp().is_none());
        assert!(config.customer_directory_url.is_none());
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = Config::from_pairs(pairs(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = Config::from_pairs(pairs(&[("STORE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn smtp_sender_defaults_to_username() {
        let config = Config::from_pairs(pairs(&[
            ("STORE_BACKEND", "memory"),
            ("SMTP_USERNAME", "clinic@example.com"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_PORT", "2465"),
        ]))
        .unwrap();
        let smtp = config.smtp().unwrap();
        assert_eq!(smtp.from, "clinic@example.com");
        assert_eq!(smtp.port, 2465);
    }

    #[test]
    fn directory_url_must_be_absolute() {
        let err = Config::from_pairs(pairs(&[
            ("STORE_BACKEND", "memory"),
            ("CUSTOMER_DIRECTORY_URL", "/customers"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDirectoryUrl(_)));

        let config = Config::from_pairs(pairs(&[
            ("STORE_BACKEND", "memory"),
            ("CUSTOMER_DIRECTORY_URL", "https://directory.example.com/v1/customers"),
        ]))
        .unwrap();
        let url = config.directory_url().unwrap().unwrap();
        assert_eq!(url.host_str(), Some("directory.example.com"));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_pairs(pairs(&[
            ("STORE_BACKEND", "memory"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env(_)));
    }
}
