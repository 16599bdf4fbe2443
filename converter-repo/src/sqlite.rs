//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use converter_types::{
    ConversionRepository, ConversionTransaction, NewConversion, RepoError, TransactionId,
};

use crate::types::{CONVERSION_COLUMNS, SqliteConversionRow, db_err};

const MIGRATION: &str = include_str!("../migrations/0001_create_currency_conversions.sql");

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:");

        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every pooled connection to `:memory:` would see its own empty database.
        let pool_options = if in_memory {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        for statement in MIGRATION.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await.map_err(db_err)?;
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ConversionRepository for SqliteRepo {
    async fn add_conversion(
        &self,
        conversion: NewConversion,
    ) -> Result<ConversionTransaction, RepoError> {
        let result = sqlx::query(
            r#"INSERT INTO currency_conversions
                   (user_id, source_currency_code, source_currency_value, target_currency_code, rate_value, datetime)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&conversion.user_id)
        .bind(&conversion.source_currency_code)
        .bind(conversion.source_currency_value)
        .bind(&conversion.target_currency_code)
        .bind(conversion.rate_value)
        .bind(conversion.datetime.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = TransactionId::new(result.last_insert_rowid());
        Ok(conversion.into_transaction(id))
    }

    async fn list_conversions_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversionTransaction>, RepoError> {
        let sql = format!(
            "SELECT {CONVERSION_COLUMNS} FROM currency_conversions WHERE user_id = ? ORDER BY transaction_id ASC"
        );
        let rows: Vec<SqliteConversionRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteConversionRow::into_domain).collect()
    }

    async fn list_all_conversions(
        &self,
        limit: i64,
    ) -> Result<Vec<ConversionTransaction>, RepoError> {
        let sql = format!(
            "SELECT {CONVERSION_COLUMNS} FROM currency_conversions ORDER BY transaction_id ASC LIMIT ?"
        );
        let rows: Vec<SqliteConversionRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(SqliteConversionRow::into_domain).collect()
    }
}
