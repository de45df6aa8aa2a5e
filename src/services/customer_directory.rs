//! Pass-through lookups against an upstream customer directory.
//!
//! The directory is an external HTTP API keyed by email. Requests carry the
//! configured API key in an `apikey` header; the JSON answer is returned to
//! the caller untouched.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;
use url::Url;

use crate::error::AppError;

const FALLBACK_MESSAGE: &str = "Failed to fetch customer data";

/// Client for the upstream customer directory.
#[derive(Debug, Clone)]
pub struct CustomerDirectory {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl CustomerDirectory {
    /// Build a directory client for `base_url`.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client (TLS backend) cannot be initialised.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        // 5 seconds per upstream call
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// URL queried for `email`, keeping any query already on the base URL.
    pub fn lookup_url(&self, email: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("email", email);
        url
    }

    /// Fetch the directory entry for `email`.
    ///
    /// Upstream failures keep the upstream status and, when the body has one,
    /// its `message`.
    pub async fn lookup(&self, email: &str) -> Result<Value, AppError> {
        let url = self.lookup_url(email);
        tracing::info!(%url, "forwarding customer lookup");

        let response = self
            .client
            .get(url)
            .header("Content-Type", "application/json")
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("customer directory unreachable: {}", e);
                AppError::Upstream {
                    status: None,
                    message: FALLBACK_MESSAGE.to_string(),
                }
            })?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            tracing::error!(%status, "customer directory rejected lookup");
            return Err(upstream_error(status.as_u16(), body.as_ref()));
        }

        body.ok_or_else(|| AppError::Upstream {
            status: None,
            message: FALLBACK_MESSAGE.to_string(),
        })
    }
}

/// Map an upstream failure onto an `AppError`, keeping its status and message.
fn upstream_error(status: u16, body: Option<&Value>) -> AppError {
    let message = body
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(FALLBACK_MESSAGE)
        .to_string();

    AppError::Upstream {
        status: StatusCode::from_u16(status).ok(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn directory(base: &str) -> CustomerDirectory {
        CustomerDirectory::new(Url::parse(base).unwrap(), "k").unwrap()
    }

    #[test]
    fn lookup_url_encodes_email() {
        let directory = directory("https://directory.example.com/v1/customers");
        assert_eq!(
            directory.lookup_url("a+b@example.com").as_str(),
            "https://directory.example.com/v1/customers?email=a%2Bb%40example.com"
        );
    }

    #[test]
    fn lookup_url_keeps_existing_query() {
        let directory = directory("https://directory.example.com/c?tenant=9");
        assert_eq!(
            directory.lookup_url("x@y.z").query(),
            Some("tenant=9&email=x%40y.z")
        );
    }

    #[test]
    fn upstream_message_is_forwarded() {
        let err = upstream_error(404, Some(&json!({"message": "Customer not registered"})));
        match err {
            AppError::Upstream { status, message } => {
                assert_eq!(status, Some(StatusCode::NOT_FOUND));
                assert_eq!(message, "Customer not registered");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_message_falls_back() {
        let err = upstream_error(503, None);
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
    }
}
