//! # velobridge-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ReadingStore` / `ReadingTransaction` ports defined in
//!   `velobridge-app::ports::store`
//! - Manage `SQLite` connection pool lifecycle
//! - Run the embedded migrations that create the four telemetry tables
//! - Map readings onto parameterized insert statements
//!
//! ## Dependency rule
//! Depends on `velobridge-app` (for port traits) and `velobridge-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod reading_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reading_store::{SqliteReadingStore, SqliteReadingTransaction};
