//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Store Errors**: Any failure reported by the relational store
/// - **Resource Errors**: A keyed lookup matched no row
/// - **Validation Errors**: Invalid request data
/// - **Upstream Errors**: The customer directory answered with a failure
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Wraps any sqlx::Error through `#[from]`, so `?` works directly on queries.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store failure that did not originate in sqlx (e.g. a poisoned backend).
    #[error("Store error: {0}")]
    Store(String),

    /// No customer matches the requested email.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("No customer found with email {0}")]
    CustomerNotFound(String),

    /// Requested account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account {0} not found")]
    AccountNotFound(i64),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The customer directory rejected the lookup or could not be reached.
    ///
    /// `status` is the upstream status when one was received.
    #[error("{message}")]
    Upstream {
        status: Option<StatusCode>,
        message: String,
    },
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::CustomerNotFound(_) => (StatusCode::NOT_FOUND, "customer_not_found"),
            AppError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "account_not_found"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Upstream { status, .. } => (
                status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "upstream_error",
            ),
            AppError::Database(_) | AppError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_failure")
            }
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Store failures carry the underlying error text so callers can see what the
/// store reported.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
