//! Currency Converter Application Service
//!
//! Orchestrates one conversion: normalize and validate the codes, resolve
//! their rates from the cache or a single provider fetch, derive the
//! cross-rate and persist the transaction. Holds no mutable state between
//! calls; the cache, provider and repository are injected.

use chrono::Utc;
use futures::future::join_all;

use converter_types::{
    CacheBackend, ConversionError, ConversionRepository, ConversionTransaction, CurrencyCode,
    NewConversion, RateProvider, RateTable, cross_rate, rate_cache_key,
    seconds_until_next_utc_midnight,
};

use crate::cache::RateCache;

/// Cache key prefix used when none is configured.
pub const DEFAULT_RATE_KEY_PREFIX: &str = "eur-rate-";

/// Listing bound when no user filter is given.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

const WORKING_TABLE_BASE: &str = "EUR";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub rate_key_prefix: String,
    pub list_limit: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rate_key_prefix: DEFAULT_RATE_KEY_PREFIX.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Application service for currency conversions.
///
/// Generic over its three ports so tests can inject doubles and the binary
/// can pick adapters at compile time.
pub struct CurrencyConverterService<C, P, R>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    cache: RateCache<C>,
    provider: P,
    repo: R,
    config: ServiceConfig,
}

impl<C, P, R> CurrencyConverterService<C, P, R>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    pub fn new(cache: C, provider: P, repo: R, config: ServiceConfig) -> Self {
        Self {
            cache: RateCache::new(cache),
            provider,
            repo,
            config,
        }
    }

    pub fn cache(&self) -> &RateCache<C> {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts `source_value` of `source` into `target` and records it.
    ///
    /// Nothing is read or written if either code is malformed, and nothing
    /// is persisted unless both rates resolve.
    #[tracing::instrument(skip(self))]
    pub async fn convert(
        &self,
        source: &str,
        source_value: f64,
        target: &str,
        user_id: &str,
    ) -> Result<ConversionTransaction, ConversionError> {
        let source = CurrencyCode::parse(source)?;
        let target = CurrencyCode::parse(target)?;

        let rates = self.resolve_rates(&[&source, &target]).await?;
        let rate_value = cross_rate(&rates, &source, &target)?;

        let conversion = NewConversion {
            user_id: user_id.to_string(),
            source_currency_code: source.to_string(),
            source_currency_value: source_value,
            target_currency_code: target.to_string(),
            rate_value,
            datetime: Utc::now(),
        };

        let tx = self.repo.add_conversion(conversion).await?;
        tracing::info!(
            transaction_id = %tx.transaction_id,
            rate_value,
            "Conversion recorded"
        );
        Ok(tx)
    }

    /// Lists one user's conversions, or the first `list_limit` of everyone's.
    #[tracing::instrument(skip(self))]
    pub async fn get_conversions(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<ConversionTransaction>, ConversionError> {
        let conversions = match user_id {
            Some(user_id) => self.repo.list_conversions_by_user(user_id).await?,
            None => self.repo.list_all_conversions(self.config.list_limit).await?,
        };
        Ok(conversions)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate resolution
    // ─────────────────────────────────────────────────────────────────────────────

    /// Builds a working table holding a rate for every code in `codes`.
    ///
    /// Each code is looked up in the cache first. The provider is called at
    /// most once, on the first miss; the whole fetched table is then written
    /// back to the cache.
    async fn resolve_rates(&self, codes: &[&CurrencyCode]) -> Result<RateTable, ConversionError> {
        let mut distinct: Vec<&CurrencyCode> = Vec::with_capacity(codes.len());
        for &code in codes {
            if !distinct.contains(&code) {
                distinct.push(code);
            }
        }

        let cached = join_all(distinct.iter().map(|code| self.cached_rate(code))).await;

        let mut table = RateTable::new(WORKING_TABLE_BASE);
        let mut fetched: Option<RateTable> = None;
        let mut written_back = false;

        for (code, hit) in distinct.into_iter().zip(cached) {
            if let Some(rate) = hit {
                table.insert(code.as_str(), rate);
                continue;
            }

            let all_rates: &RateTable = match fetched {
                Some(ref all_rates) => all_rates,
                None => fetched.insert(self.fetch_all_rates().await?),
            };
            table.base_currency.clone_from(&all_rates.base_currency);

            let rate = all_rates
                .get(code.as_str())
                .ok_or_else(|| ConversionError::not_found(code.as_str()))?;
            table.insert(code.as_str(), rate);

            if !written_back {
                self.write_back(all_rates).await;
                written_back = true;
            }
        }

        Ok(table)
    }

    async fn cached_rate(&self, code: &CurrencyCode) -> Option<f64> {
        let key = rate_cache_key(&self.config.rate_key_prefix, code.as_str());
        let raw = self.cache.get(&key).await?;

        match raw.parse::<f64>() {
            Ok(rate) => {
                tracing::debug!(%code, rate, "Rate found in cache");
                Some(rate)
            }
            Err(_) => {
                tracing::warn!(%code, value = %raw, "Ignoring unparsable cached rate");
                None
            }
        }
    }

    async fn fetch_all_rates(&self) -> Result<RateTable, ConversionError> {
        self.provider.fetch_all_rates().await.map_err(|e| {
            tracing::error!(error = %e, "Rate provider unavailable");
            ConversionError::Unavailable(e.to_string())
        })
    }

    /// Caches every rate of `table` until the next UTC midnight.
    ///
    /// Stops at the first failed write.
    async fn write_back(&self, table: &RateTable) {
        let ttl = seconds_until_next_utc_midnight(Utc::now());
        let mut written = 0usize;

        for (code, rate) in table.iter() {
            let key = rate_cache_key(&self.config.rate_key_prefix, code);
            if !self.cache.set(&key, &rate.to_string(), ttl).await {
                tracing::warn!(written, total = table.len(), "Aborting rate write-back");
                return;
            }
            written += 1;
        }

        tracing::debug!(written, ttl_secs = ttl, "Rates written back to cache");
    }
}
