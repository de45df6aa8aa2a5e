//! Partner (service provider) records and their published availability.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Represents a row from the `partner` table.
///
/// Partners are identified across tables by `provider_number`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Partner {
    pub id: i64,
    pub provider_number: i64,
    pub name: String,
    pub specialty: Option<String>,
    pub email: Option<String>,
}

/// Represents a row from the `provider_availability` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct ProviderAvailability {
    pub id: i64,
    pub provider_number: i64,
    pub provider_availability_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
