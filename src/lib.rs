//! Credit application service
//!
//! Customers register, then request credits that must start within the next three months. A
//! credit is only ever disclosed to the customer who owns it.
//!
//! The crate is split along ports and adapters:
//!
//! - [`domain`]: entities and the business rules that need no I/O
//! - [`ports`]: what the commands need from storage
//! - [`commands`]: one `tower::Service` per operation
//! - [`adapters`]: in-memory and PostgreSQL stores, and the HTTP API

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
