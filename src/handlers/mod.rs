//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, query string)
//! 2. Runs one store operation, directly or through a service
//! 3. Returns JSON rows or an `AppError`

/// Account endpoints
pub mod accounts;
/// Appointment listing and booked slots
pub mod appointments;
/// Customer lookups and the directory proxy
pub mod customers;
/// Liveness and store connectivity
pub mod health;
/// Partners and their availability
pub mod partners;
/// Reminder trigger
pub mod reminders;
/// Transaction listing, insertion and budget views
pub mod transactions;
