//! Banking and appointments API server.
//!
//! A REST API over a relational store: customers, accounts and their
//! transactions, partners with their availability, and appointments with
//! email reminders. Inserting a transaction recomputes the owning account's
//! cached balance in the same store transaction.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, or an in-memory store for local runs
//! - **Mail**: SMTP relay through lettre
//! - **Format**: JSON requests/responses

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
