//! Conversion transaction domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier assigned by the persistence layer on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversion about to be persisted. Has no id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversion {
    pub user_id: String,
    pub source_currency_code: String,
    pub source_currency_value: f64,
    pub target_currency_code: String,
    pub rate_value: f64,
    pub datetime: DateTime<Utc>,
}

impl NewConversion {
    /// Attaches the id the repository assigned.
    pub fn into_transaction(self, id: TransactionId) -> ConversionTransaction {
        ConversionTransaction {
            transaction_id: id,
            user_id: self.user_id,
            source_currency_code: self.source_currency_code,
            source_currency_value: self.source_currency_value,
            target_currency_code: self.target_currency_code,
            rate_value: self.rate_value,
            datetime: self.datetime,
        }
    }
}

/// A recorded currency conversion.
///
/// Transactions are immutable once created. Only the rate is stored; the
/// converted amount is derived with [`ConversionTransaction::target_currency_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionTransaction {
    pub transaction_id: TransactionId,
    #[schema(example = "user1")]
    pub user_id: String,
    #[schema(example = "USD")]
    pub source_currency_code: String,
    #[schema(example = 100.0)]
    pub source_currency_value: f64,
    #[schema(example = "BRL")]
    pub target_currency_code: String,
    /// Multiplier applied to the source value (`target rate / source rate`)
    #[schema(example = 5.0)]
    pub rate_value: f64,
    /// When the conversion was performed (UTC)
    pub datetime: DateTime<Utc>,
}

impl ConversionTransaction {
    pub fn target_currency_value(&self) -> f64 {
        self.source_currency_value * self.rate_value
    }
}
