use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::info;

use crate::utils::logging::log_database_operation;

/// Columns added after the first schema; older databases get them on startup.
const LEGACY_COLUMNS: &[(&str, &str, &str)] = &[
    ("titles", "created_by", "INTEGER NOT NULL DEFAULT 0"),
    ("episodes", "created_by", "INTEGER NOT NULL DEFAULT 0"),
];

#[derive(Clone)]
pub struct DatabaseManager {
    pub pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            info!("Creating database {}", database_url);
            Sqlite::create_database(database_url).await?;
        }

        let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        for (table, column, definition) in LEGACY_COLUMNS {
            self.ensure_column(table, column, definition).await?;
        }
        Ok(())
    }

    /// Adds `column` to `table` unless it is already there.
    pub async fn ensure_column(&self, table: &str, column: &str, definition: &str) -> Result<bool> {
        let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
            .fetch_all(&self.pool)
            .await?;
        let exists = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .any(|name| name == column);
        if exists {
            return Ok(false);
        }

        log_database_operation("ALTER", table, Some(&format!("add column {column}")));
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
            .execute(&self.pool)
            .await?;
        Ok(true)
    }
}
