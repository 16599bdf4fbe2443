//! Exchange rate provider port.
//!
//! This trait defines the interface for upstream rate services.
//! Implementations can be HTTP clients, mock providers, etc.

use crate::domain::RateTable;

/// Error type for exchange rate operations.
///
/// Every variant means the provider could not be used right now; none of
/// them says anything about whether a currency exists.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Circuit breaker is open")]
    CircuitOpen,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider responded with HTTP {0}")]
    Status(u16),

    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    #[error("Invalid provider response: {0}")]
    Decode(String),
}

/// Port trait for exchange rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Fetches the full current rate table against the provider's base currency.
    async fn fetch_all_rates(&self) -> Result<RateTable, ExchangeError>;
}
