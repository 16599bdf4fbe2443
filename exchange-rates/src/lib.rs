//! # Exchange Rates
//!
//! Rate provider adapter for the currency converter.
//!
//! [`ExchangeRatesClient`] fetches the full rate table from the upstream
//! provider in one HTTP call and implements the `RateProvider` port. Every
//! call goes through a [`CircuitBreaker`] so a failing provider is not
//! hammered: after repeated failures calls fail fast until a cooldown passes.
//!
//! # Example
//! ```no_run
//! use converter_types::RateProvider;
//! use exchange_rates::{ExchangeRatesClient, ExchangeRatesConfig};
//!
//! # async fn run() -> Result<(), converter_types::ExchangeError> {
//! let config = ExchangeRatesConfig::new("http://api.exchangeratesapi.io/v1/latest", "key");
//! let client = ExchangeRatesClient::new(config)?;
//! let table = client.fetch_all_rates().await?;
//! println!("{} rates against {}", table.len(), table.base_currency);
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod client;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::{ExchangeRatesClient, ExchangeRatesConfig};
