//! Database access layer
//!
//! SQLite via sqlx. Schema is created idempotently at startup; all guids are
//! UUIDv4 strings and all timestamps use the canonical RFC 3339 format from
//! `crate::time`.

pub mod init;
pub mod models;

pub use init::init_database;
