//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/query types that accompany them.

/// Bank accounts
pub mod account;
/// Appointments booked with partners
pub mod appointment;
/// Banking customers
pub mod customer;
/// Partners and their availability
pub mod partner;
/// Account transactions and budget views
pub mod transaction;
