//! Persistence layer: SQLite-backed ad event log, transaction ledger,
//! and creative catalog tables.
//!
//! All storage access is async through `sqlx::SqlitePool`. Failures
//! surface as [`crate::error::ServingError::Persistence`]; callers treat
//! them as "no data available", never as partial data.

pub mod models;
pub mod sqlite;

pub use sqlite::SqliteStore;
