//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;

use converter_types::{
    ConversionRepository, ConversionTransaction, NewConversion, RepoError, TransactionId,
};

use crate::types::{CONVERSION_COLUMNS, PgConversionRow, db_err};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        execute_migration(
            &pool,
            include_str!("../migrations/0001_create_currency_conversions_pg.sql"),
            "0001",
        )
        .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ConversionRepository for PostgresRepo {
    async fn add_conversion(
        &self,
        conversion: NewConversion,
    ) -> Result<ConversionTransaction, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO currency_conversions
                   (user_id, source_currency_code, source_currency_value, target_currency_code, rate_value, datetime)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING transaction_id"#,
        )
        .bind(&conversion.user_id)
        .bind(&conversion.source_currency_code)
        .bind(conversion.source_currency_value)
        .bind(&conversion.target_currency_code)
        .bind(conversion.rate_value)
        .bind(conversion.datetime)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(conversion.into_transaction(TransactionId::new(id)))
    }

    async fn list_conversions_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversionTransaction>, RepoError> {
        let sql = format!(
            "SELECT {CONVERSION_COLUMNS} FROM currency_conversions WHERE user_id = $1 ORDER BY transaction_id ASC"
        );
        let rows: Vec<PgConversionRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_all_conversions(
        &self,
        limit: i64,
    ) -> Result<Vec<ConversionTransaction>, RepoError> {
        let sql = format!(
            "SELECT {CONVERSION_COLUMNS} FROM currency_conversions ORDER BY transaction_id ASC LIMIT $1"
        );
        let rows: Vec<PgConversionRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
