//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConversionTransaction, TransactionId};

/// Smallest source amount the HTTP API accepts.
pub const MIN_SOURCE_CURRENCY_VALUE: f64 = 0.1;

/// Header carrying the caller identity.
pub const USER_ID_HEADER: &str = "user-id";

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Currency to convert from (case-insensitive)
    #[schema(example = "USD")]
    pub source_currency_code: String,
    /// Amount to convert, at least 0.1
    #[schema(example = 100.0)]
    pub source_currency_value: f64,
    /// Currency to convert to (case-insensitive)
    #[schema(example = "BRL")]
    pub target_currency_code: String,
}

/// Response after a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionResponse {
    pub transaction_id: TransactionId,
    #[schema(example = "user1")]
    pub user_id: String,
    #[schema(example = "USD")]
    pub source_currency_code: String,
    #[schema(example = 100.0)]
    pub source_currency_value: f64,
    #[schema(example = "BRL")]
    pub target_currency_code: String,
    /// `source_currency_value * rate_value`
    #[schema(example = 500.0)]
    pub target_currency_value: f64,
    #[schema(example = 5.0)]
    pub rate_value: f64,
    pub datetime: DateTime<Utc>,
}

impl From<ConversionTransaction> for ConversionResponse {
    fn from(tx: ConversionTransaction) -> Self {
        let target_currency_value = tx.target_currency_value();
        Self {
            transaction_id: tx.transaction_id,
            user_id: tx.user_id,
            source_currency_code: tx.source_currency_code,
            source_currency_value: tx.source_currency_value,
            target_currency_code: tx.target_currency_code,
            target_currency_value,
            rate_value: tx.rate_value,
            datetime: tx.datetime,
        }
    }
}

/// Query parameters for listing conversions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ConversionsQuery {
    /// Only list this user's conversions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
