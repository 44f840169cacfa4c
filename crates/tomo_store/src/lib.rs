//! SQLite persistence for check-ins and completion records.

pub mod sqlite;

pub use sqlite::SqliteStore;
