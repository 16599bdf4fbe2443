//! HTTP client for the upstream exchange rates provider.
//!
//! One GET to the configured endpoint returns every rate against the
//! provider's base currency. The credential travels as the `access_key`
//! query parameter.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use converter_types::{ExchangeError, RateProvider, RateTable, validate_currency};

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};

/// Base currency assumed when the provider omits it.
pub const DEFAULT_BASE_CURRENCY: &str = "EUR";

/// Default HTTP timeout for one provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`ExchangeRatesClient`].
#[derive(Debug, Clone)]
pub struct ExchangeRatesConfig {
    pub base_url: String,
    pub access_key: String,
    pub timeout: Duration,
    pub breaker: CircuitBreakerConfig,
}

impl ExchangeRatesConfig {
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_key: access_key.into(),
            timeout: DEFAULT_TIMEOUT,
            breaker: CircuitBreakerConfig::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_breaker(mut self, breaker: CircuitBreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default = "default_success")]
    success: bool,
    timestamp: Option<i64>,
    base: Option<String>,
    date: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

fn default_success() -> bool {
    true
}

impl RatesResponse {
    fn into_table(self) -> Result<RateTable, ExchangeError> {
        if !self.success {
            let reason = self
                .error
                .map(|e| {
                    format!(
                        "{} ({}): {}",
                        e.kind.unwrap_or_else(|| "unknown".into()),
                        e.code.map(|c| c.to_string()).unwrap_or_default(),
                        e.info.unwrap_or_default()
                    )
                })
                .unwrap_or_else(|| "success=false".into());
            return Err(ExchangeError::Rejected(reason));
        }

        let mut table =
            RateTable::new(self.base.unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string()));
        table.timestamp = self.timestamp;
        table.date = self.date;

        for (code, rate) in self.rates {
            let code = code.to_uppercase();
            if validate_currency(&code, None).is_err() {
                tracing::warn!(%code, "Skipping malformed currency code from provider");
                continue;
            }
            table.insert(code, rate);
        }

        Ok(table)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Rate provider backed by an exchangeratesapi-style HTTP endpoint.
pub struct ExchangeRatesClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
    breaker: CircuitBreaker,
}

impl ExchangeRatesClient {
    /// Creates a client with its own circuit breaker.
    pub fn new(config: ExchangeRatesConfig) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExchangeError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            access_key: config.access_key,
            breaker: CircuitBreaker::new(config.breaker),
        })
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn request_rates(&self) -> Result<RateTable, ExchangeError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("access_key", self.access_key.as_str())])
            .send()
            .await
            .map_err(|e| ExchangeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        response
            .json::<RatesResponse>()
            .await
            .map_err(|e| ExchangeError::Decode(e.to_string()))?
            .into_table()
    }
}

#[async_trait]
impl RateProvider for ExchangeRatesClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_all_rates(&self) -> Result<RateTable, ExchangeError> {
        tracing::info!("Start fetching all currency conversion rates");

        match self.breaker.call(|| self.request_rates()).await {
            Ok(table) => {
                tracing::info!(
                    base = %table.base_currency,
                    count = table.len(),
                    "Successfully fetched all currency conversion rates"
                );
                Ok(table)
            }
            Err(ExchangeError::CircuitOpen) => {
                tracing::error!("Exchange Rates API currently unavailable");
                Err(ExchangeError::CircuitOpen)
            }
            Err(e) => {
                tracing::error!(error = %e, "An error occurred when fetching rates");
                Err(e)
            }
        }
    }
}
