//! Customer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a row from the `customers` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Query string for customer lookups by email.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}
