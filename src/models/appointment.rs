//! Appointment models.
//!
//! This module defines:
//! - `Appointment`: full row from the `appointment` table
//! - `BookedSlot` / `BookedTime`: projections used by the slot-picker endpoints
//! - `DueAppointment`: appointment joined with its partner, for reminders

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Represents a row from the `appointment` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub provider_number: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub patient_name: String,
    pub patient_email: String,

    /// Set once a reminder mail has been delivered
    pub reminder_sent: bool,
}

impl Appointment {
    /// Start of the appointment as a naive UTC timestamp.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.appointment_date.and_time(self.appointment_time)
    }
}

/// Which provider is booked at which date and time.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct BookedSlot {
    pub provider_number: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
}

/// A booked time for a provider on an already-known date.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize)]
pub struct BookedTime {
    pub appointment_time: NaiveTime,
}

/// Appointment that still needs a reminder.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DueAppointment {
    pub id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,

    /// Name of the partner the appointment is with, when the partner exists
    pub partner_name: Option<String>,
}
