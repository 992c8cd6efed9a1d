//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StorageError;

/// Configuration for the `SQLite` storage adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:velobridge.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Upper bound on pooled connections shared by all writers.
    pub max_connections: u32,
    /// Run the embedded migrations on startup.
    pub create_schema: bool,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the connection pool, creates the database file if missing,
    /// and, when `create_schema` is set, runs all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is invalid, the connection fails,
    /// or the migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::initialize(&self).await
    }
}

/// Apply the embedded migrations that have not run on `pool` yet.
async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Holds the `SQLite` connection pool and provides access to it.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn initialize(config: &Config) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        if config.create_schema {
            migrate(&pool).await?;
        }

        tracing::info!(
            max_connections = config.max_connections,
            create_schema = config.create_schema,
            "database pool ready"
        );

        Ok(Self { pool })
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(create_schema: bool) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            create_schema,
        }
    }

    const TABLES: [&str; 4] = [
        "batteries",
        "battery_reading_bat_temps",
        "battery_reading_cell_voltages",
        "locations",
    ];

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' AND name <> '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap();
        tables.into_iter().map(|row| row.0).collect()
    }

    #[tokio::test]
    async fn should_create_pool_and_tables_when_using_memory_db() {
        let db = memory_config(true).build().await.unwrap();
        assert_eq!(table_names(db.pool()).await, TABLES);
    }

    #[tokio::test]
    async fn should_not_create_tables_when_schema_creation_disabled() {
        let db = memory_config(false).build().await.unwrap();
        assert!(table_names(db.pool()).await.is_empty());
    }

    #[tokio::test]
    async fn should_tolerate_repeated_migration() {
        let db = memory_config(true).build().await.unwrap();
        migrate(db.pool()).await.unwrap();
        assert_eq!(table_names(db.pool()).await, TABLES);
    }

    #[tokio::test]
    async fn should_record_applied_migration() {
        let db = memory_config(true).build().await.unwrap();
        let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[tokio::test]
    async fn should_enable_foreign_keys() {
        let db = memory_config(true).build().await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn should_mark_pool_closed_after_close() {
        let db = memory_config(true).build().await.unwrap();
        db.close().await;
        assert!(db.pool().is_closed());
    }
}
