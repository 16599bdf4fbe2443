//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use converter_hex::ServiceConfig;
use converter_hex::inbound::DEFAULT_REQUESTS_PER_MINUTE;
use converter_hex::service::{DEFAULT_LIST_LIMIT, DEFAULT_RATE_KEY_PREFIX};
use exchange_rates::circuit_breaker::{DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT};
use exchange_rates::client::DEFAULT_TIMEOUT;
use exchange_rates::{CircuitBreakerConfig, ExchangeRatesConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub api_url: String,
    pub api_access_key: String,
    pub cache_rate_key_prefix: String,
    pub circuit_breaker_fail_max: u32,
    pub circuit_breaker_reset_timeout: Duration,
    pub provider_timeout: Duration,
    pub conversions_list_limit: i64,
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{key} environment variable is required"))
        };

        let conversions_list_limit: i64 =
            parse_or(&lookup, "CONVERSIONS_LIST_LIMIT", DEFAULT_LIST_LIMIT)?;
        if conversions_list_limit <= 0 {
            anyhow::bail!(
                "CONVERSIONS_LIST_LIMIT must be greater than zero, got {conversions_list_limit}"
            );
        }

        Ok(Self {
            port: parse_or(&lookup, "PORT", 3000)?,
            database_url: required("DATABASE_URL")?,
            api_url: required("API_URL")?,
            api_access_key: required("API_ACCESS_KEY")?,
            cache_rate_key_prefix: lookup("CACHE_RATE_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_RATE_KEY_PREFIX.to_string()),
            circuit_breaker_fail_max: parse_or(
                &lookup,
                "CIRCUIT_BREAKER_FAIL_MAX",
                DEFAULT_FAILURE_THRESHOLD,
            )?,
            circuit_breaker_reset_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CIRCUIT_BREAKER_RESET_TIMEOUT_SECS",
                DEFAULT_RESET_TIMEOUT.as_secs(),
            )?),
            provider_timeout: Duration::from_secs(parse_or(
                &lookup,
                "PROVIDER_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )?),
            conversions_list_limit,
            rate_limit_per_minute: parse_or(
                &lookup,
                "RATE_LIMIT_PER_MINUTE",
                DEFAULT_REQUESTS_PER_MINUTE,
            )?,
        })
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            rate_key_prefix: self.cache_rate_key_prefix.clone(),
            list_limit: self.conversions_list_limit,
        }
    }

    pub fn exchange_rates_config(&self) -> ExchangeRatesConfig {
        ExchangeRatesConfig::new(&self.api_url, &self.api_access_key)
            .with_timeout(self.provider_timeout)
            .with_breaker(CircuitBreakerConfig {
                failure_threshold: self.circuit_breaker_fail_max,
                reset_timeout: self.circuit_breaker_reset_timeout,
            })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {e}")),
        None => Ok(default),
    }
}
