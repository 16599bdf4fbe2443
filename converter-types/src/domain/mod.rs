//! Domain models for the currency converter.

pub mod conversion;
pub mod currency;
pub mod rates;

pub use conversion::{ConversionTransaction, NewConversion, TransactionId};
pub use currency::{CurrencyCode, validate_currency};
pub use rates::{RateTable, cross_rate, rate_cache_key, seconds_until_next_utc_midnight};
