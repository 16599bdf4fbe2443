//! Database row types for SQLite and PostgreSQL.

use sqlx::FromRow;

use converter_types::{ConversionTransaction, RepoError, TransactionId};

/// Columns selected by every conversion query, in row-struct order.
pub const CONVERSION_COLUMNS: &str = "transaction_id, user_id, source_currency_code, \
     source_currency_value, target_currency_code, rate_value, datetime";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows (timestamps stored as RFC 3339 text)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
#[derive(FromRow)]
pub struct SqliteConversionRow {
    pub transaction_id: i64,
    pub user_id: String,
    pub source_currency_code: String,
    pub source_currency_value: f64,
    pub target_currency_code: String,
    pub rate_value: f64,
    pub datetime: String,
}

#[cfg(feature = "sqlite")]
impl SqliteConversionRow {
    /// Convert database row to domain ConversionTransaction.
    pub fn into_domain(self) -> Result<ConversionTransaction, RepoError> {
        let datetime = chrono::DateTime::parse_from_rfc3339(&self.datetime)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(ConversionTransaction {
            transaction_id: TransactionId::new(self.transaction_id),
            user_id: self.user_id,
            source_currency_code: self.source_currency_code,
            source_currency_value: self.source_currency_value,
            target_currency_code: self.target_currency_code,
            rate_value: self.rate_value,
            datetime,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
#[derive(FromRow)]
pub struct PgConversionRow {
    pub transaction_id: i64,
    pub user_id: String,
    pub source_currency_code: String,
    pub source_currency_value: f64,
    pub target_currency_code: String,
    pub rate_value: f64,
    pub datetime: chrono::DateTime<chrono::Utc>,
}

#[cfg(feature = "postgres")]
impl From<PgConversionRow> for ConversionTransaction {
    fn from(row: PgConversionRow) -> Self {
        ConversionTransaction {
            transaction_id: TransactionId::new(row.transaction_id),
            user_id: row.user_id,
            source_currency_code: row.source_currency_code,
            source_currency_value: row.source_currency_value,
            target_currency_code: row.target_currency_code,
            rate_value: row.rate_value,
            datetime: row.datetime,
        }
    }
}

/// Maps any sqlx error into the repository error type.
pub fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}
