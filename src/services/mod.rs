//! Business logic services.
//!
//! Services contain logic separated from HTTP handlers: the balance
//! recalculator, transaction recording, reminder delivery, mail, and the
//! upstream customer directory.

pub mod balance;
pub mod customer_directory;
pub mod mail_service;
pub mod reminder_service;
pub mod transaction_service;
