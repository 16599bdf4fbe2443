//! Rate tables and the arithmetic derived from them.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::currency::{CurrencyCode, validate_currency};
use crate::error::ConversionError;

/// Rates of every known currency against a single base currency.
///
/// A rate is the value of one unit of `base_currency` expressed in the keyed
/// currency. Tables built during a conversion are partial: they hold only the
/// codes that request needed, filled from cache hits or a provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub base_currency: String,
    /// Epoch seconds reported by the provider, if any.
    pub timestamp: Option<i64>,
    /// Rate date reported by the provider, if any.
    pub date: Option<String>,
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Creates an empty table for the given base currency.
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            timestamp: None,
            date: None,
            rates: HashMap::new(),
        }
    }

    pub fn with_rates<I, K>(base_currency: impl Into<String>, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table = Self::new(base_currency);
        for (code, rate) in rates {
            table.insert(code, rate);
        }
        table
    }

    pub fn insert(&mut self, code: impl Into<String>, rate: f64) {
        self.rates.insert(code.into(), rate);
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Derives the multiplier that turns an amount of `source` into `target`.
///
/// A code absent from the table is `CodeNotFound`; a code whose rate is
/// zero, negative or not finite is `InvalidCurrency`. The source is checked
/// before the target.
pub fn cross_rate(
    table: &RateTable,
    source: &CurrencyCode,
    target: &CurrencyCode,
) -> Result<f64, ConversionError> {
    let source_rate = table
        .get(source.as_str())
        .ok_or_else(|| ConversionError::not_found(source.as_str()))?;
    let target_rate = table
        .get(target.as_str())
        .ok_or_else(|| ConversionError::not_found(target.as_str()))?;

    validate_currency(source.as_str(), Some(source_rate))?;
    validate_currency(target.as_str(), Some(target_rate))?;

    // Unreachable after validation; kept so a zero divisor can never surface
    // as an infinite rate.
    if source_rate == 0.0 {
        return Err(ConversionError::invalid_rate(source.as_str(), source_rate));
    }

    let rate = target_rate / source_rate;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ConversionError::invalid_rate(source.as_str(), source_rate));
    }

    Ok(rate)
}

/// Cache key under which the rate of `code` is stored.
pub fn rate_cache_key(prefix: &str, code: &str) -> String {
    format!("{prefix}{code}")
}

/// Seconds from `now` until the next UTC midnight, never less than one.
///
/// Used as the TTL of cached rates so a whole table expires together when
/// the provider publishes the next day's rates.
pub fn seconds_until_next_utc_midnight(now: DateTime<Utc>) -> u64 {
    let next_midnight = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc());

    match next_midnight {
        Some(midnight) => (midnight - now).num_seconds().max(1) as u64,
        None => 24 * 60 * 60,
    }
}
