//! CurrencyConverterService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use converter_types::{
        CacheBackend, CacheError, ConversionError, ConversionRepository, ConversionTransaction,
        ExchangeError, NewConversion, RateProvider, RateTable, RepoError, TransactionId,
        seconds_until_next_utc_midnight,
    };

    use crate::{CurrencyConverterService, ServiceConfig};

    // ─────────────────────────────────────────────────────────────────────────
    // Test doubles
    // ─────────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, String>>,
        fail_get: bool,
        fail_set: bool,
        gets: AtomicUsize,
        sets: AtomicUsize,
        ttls: Mutex<Vec<Duration>>,
    }

    impl MockCache {
        pub fn with_entries(entries: &[(&str, &str)]) -> Self {
            let cache = Self::default();
            {
                let mut map = cache.entries.lock().unwrap();
                for (k, v) in entries {
                    map.insert(k.to_string(), v.to_string());
                }
            }
            cache
        }

        pub fn failing_get() -> Self {
            Self {
                fail_get: true,
                ..Self::default()
            }
        }

        pub fn failing_set() -> Self {
            Self {
                fail_set: true,
                ..Self::default()
            }
        }

        pub fn value(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn gets(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn sets(&self) -> usize {
            self.sets.load(Ordering::SeqCst)
        }

        /// TTLs passed to `set`, in call order.
        pub fn ttls(&self) -> Vec<Duration> {
            self.ttls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CacheBackend for MockCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.fail_get {
                return Err(CacheError::Backend("connection reset".into()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.ttls.lock().unwrap().push(ttl);
            if self.fail_set {
                return Err(CacheError::Backend("read-only replica".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn flush_all(&self) -> Result<(), CacheError> {
            self.entries.lock().unwrap().clear();
            Ok(())
        }
    }

    /// Provider returning a fixed table, or failing as if the breaker were open.
    pub struct MockProvider {
        table: Option<RateTable>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        pub fn with_rates(rates: &[(&str, f64)]) -> Self {
            Self {
                table: Some(RateTable::with_rates(
                    "EUR",
                    rates.iter().map(|(code, rate)| (*code, *rate)),
                )),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn unavailable() -> Self {
            Self {
                table: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for MockProvider {
        async fn fetch_all_rates(&self) -> Result<RateTable, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.table.clone().ok_or(ExchangeError::CircuitOpen)
        }
    }

    #[derive(Default)]
    pub struct MockRepo {
        rows: Mutex<Vec<ConversionTransaction>>,
        fail: bool,
    }

    impl MockRepo {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn rows(&self) -> Vec<ConversionTransaction> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConversionRepository for MockRepo {
        async fn add_conversion(
            &self,
            conversion: NewConversion,
        ) -> Result<ConversionTransaction, RepoError> {
            if self.fail {
                return Err(RepoError::Database("insert failed".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            let tx = conversion.into_transaction(TransactionId::new(rows.len() as i64 + 1));
            rows.push(tx.clone());
            Ok(tx)
        }

        async fn list_conversions_by_user(
            &self,
            user_id: &str,
        ) -> Result<Vec<ConversionTransaction>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|tx| tx.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn list_all_conversions(
            &self,
            limit: i64,
        ) -> Result<Vec<ConversionTransaction>, RepoError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    type TestService = CurrencyConverterService<MockCache, MockProvider, MockRepo>;

    fn service(cache: MockCache, provider: MockProvider, repo: MockRepo) -> TestService {
        CurrencyConverterService::new(cache, provider, repo, ServiceConfig::default())
    }

    fn eur_table() -> MockProvider {
        MockProvider::with_rates(&[("USD", 1.1), ("BRL", 5.5), ("JPY", 165.0)])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_convert_with_empty_cache() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 100.0, "BRL", "user1").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
        assert!(approx(tx.target_currency_value(), 500.0));
        assert_eq!(tx.source_currency_value, 100.0);
        assert_eq!(tx.target_currency_code, "BRL");
        assert_eq!(tx.user_id, "user1");
        assert_eq!(svc.provider().calls(), 1);
        assert_eq!(svc.repo().rows(), vec![tx]);
    }

    #[tokio::test]
    async fn test_fetch_writes_whole_table_back() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        svc.convert("USD", 1.0, "BRL", "u").await.unwrap();

        let cache = svc.cache().backend();
        assert_eq!(cache.sets(), 3);
        assert_eq!(cache.value("eur-rate-USD").as_deref(), Some("1.1"));
        assert_eq!(cache.value("eur-rate-BRL").as_deref(), Some("5.5"));
        assert_eq!(cache.value("eur-rate-JPY").as_deref(), Some("165"));
    }

    #[tokio::test]
    async fn test_write_back_uses_single_midnight_ttl() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let before = seconds_until_next_utc_midnight(Utc::now());
        svc.convert("USD", 1.0, "BRL", "u").await.unwrap();
        let after = seconds_until_next_utc_midnight(Utc::now());

        let ttls = svc.cache().backend().ttls();
        assert_eq!(ttls.len(), 3);
        assert!(ttls.iter().all(|ttl| *ttl == ttls[0]));

        let ttl = ttls[0].as_secs();
        assert!(ttl > 0 && ttl <= 24 * 60 * 60);
        // Only comparable when the conversion did not straddle midnight.
        if after <= before {
            assert!((after..=before).contains(&ttl));
        }
    }

    #[tokio::test]
    async fn test_cached_rates_skip_provider() {
        let cache = MockCache::with_entries(&[("eur-rate-USD", "1.1"), ("eur-rate-BRL", "5.5")]);
        let svc = service(cache, MockProvider::unavailable(), MockRepo::default());

        let tx = svc.convert("USD", 10.0, "BRL", "u").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
        assert_eq!(svc.provider().calls(), 0);
        assert_eq!(svc.cache().backend().gets(), 2);
        assert_eq!(svc.cache().backend().sets(), 0);
    }

    #[tokio::test]
    async fn test_second_conversion_hits_cache() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        svc.convert("USD", 1.0, "BRL", "u").await.unwrap();
        svc.convert("JPY", 1.0, "USD", "u").await.unwrap();

        assert_eq!(svc.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_partial_hit_fetches_once() {
        let cache = MockCache::with_entries(&[("eur-rate-USD", "1.1")]);
        let svc = service(cache, eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 2.0, "JPY", "u").await.unwrap();

        assert!(approx(tx.rate_value, 150.0));
        assert_eq!(svc.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_is_target_over_source() {
        let pairs = [("USD", "BRL"), ("BRL", "USD"), ("JPY", "BRL"), ("USD", "JPY")];
        let rates: HashMap<&str, f64> = [("USD", 1.1), ("BRL", 5.5), ("JPY", 165.0)].into();
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        for (source, target) in pairs {
            let tx = svc.convert(source, 1.0, target, "u").await.unwrap();
            assert!(
                approx(tx.rate_value, rates[target] / rates[source]),
                "{source}->{target}"
            );
        }
    }

    #[tokio::test]
    async fn test_codes_are_normalized_to_upper_case() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let tx = svc.convert("usd", 1.0, "bRl", "u").await.unwrap();

        assert_eq!(tx.source_currency_code, "USD");
        assert_eq!(tx.target_currency_code, "BRL");
    }

    #[tokio::test]
    async fn test_same_currency_looks_up_once() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 3.0, "usd", "u").await.unwrap();

        assert!(approx(tx.rate_value, 1.0));
        assert_eq!(svc.cache().backend().gets(), 1);
        assert_eq!(svc.provider().calls(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Failure kinds
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_malformed_code_does_no_io() {
        for (source, target) in [("US1", "BRL"), ("USD", "BR"), ("", "BRL"), ("USD", "B-L")] {
            let svc = service(MockCache::default(), eur_table(), MockRepo::default());

            let err = svc.convert(source, 1.0, target, "u").await.unwrap_err();

            assert!(
                matches!(err, ConversionError::InvalidCurrency { rate: None, .. }),
                "{source}->{target}: {err:?}"
            );
            assert_eq!(svc.cache().backend().gets(), 0);
            assert_eq!(svc.provider().calls(), 0);
            assert!(svc.repo().rows().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let err = svc.convert("USD", 1.0, "XYZ", "u").await.unwrap_err();

        assert!(matches!(err, ConversionError::CodeNotFound { ref code } if code == "XYZ"));
        assert_eq!(svc.provider().calls(), 1);
        assert!(svc.repo().rows().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_code_alone_is_not_cached() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());

        let err = svc.convert("XYZ", 1.0, "ABC", "u").await.unwrap_err();

        assert!(matches!(err, ConversionError::CodeNotFound { ref code } if code == "XYZ"));
        assert_eq!(svc.cache().backend().sets(), 0);
    }

    #[tokio::test]
    async fn test_zero_source_rate_is_invalid_currency() {
        let provider = MockProvider::with_rates(&[("USD", 0.0), ("BRL", 5.5)]);
        let svc = service(MockCache::default(), provider, MockRepo::default());

        let err = svc.convert("USD", 1.0, "BRL", "u").await.unwrap_err();

        assert!(matches!(
            err,
            ConversionError::InvalidCurrency { ref code, rate: Some(r) } if code == "USD" && r == 0.0
        ));
        assert!(svc.repo().rows().is_empty());
    }

    #[tokio::test]
    async fn test_zero_cached_target_rate_is_invalid_currency() {
        let cache = MockCache::with_entries(&[("eur-rate-USD", "1.1"), ("eur-rate-BRL", "0")]);
        let svc = service(cache, MockProvider::unavailable(), MockRepo::default());

        let err = svc.convert("USD", 1.0, "BRL", "u").await.unwrap_err();

        assert!(matches!(err, ConversionError::InvalidCurrency { ref code, .. } if code == "BRL"));
    }

    #[tokio::test]
    async fn test_provider_unavailable_persists_nothing() {
        let svc = service(
            MockCache::default(),
            MockProvider::unavailable(),
            MockRepo::default(),
        );

        let err = svc.convert("USD", 1.0, "BRL", "u").await.unwrap_err();

        assert!(matches!(err, ConversionError::Unavailable(_)));
        assert_eq!(svc.provider().calls(), 1);
        assert!(svc.repo().rows().is_empty());
    }

    #[tokio::test]
    async fn test_provider_unavailable_with_one_cached_code() {
        let cache = MockCache::with_entries(&[("eur-rate-USD", "1.1")]);
        let svc = service(cache, MockProvider::unavailable(), MockRepo::default());

        let err = svc.convert("USD", 1.0, "BRL", "u").await.unwrap_err();

        assert!(matches!(err, ConversionError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::failing());

        let err = svc.convert("USD", 1.0, "BRL", "u").await.unwrap_err();

        assert!(matches!(
            err,
            ConversionError::Repository(RepoError::Database(_))
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cache degradation
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_cache_read_failure_falls_back_to_provider() {
        let svc = service(MockCache::failing_get(), eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 100.0, "BRL", "u").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
        assert_eq!(svc.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_stops_write_back() {
        let svc = service(MockCache::failing_set(), eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 100.0, "BRL", "u").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
        assert_eq!(svc.cache().backend().sets(), 1);
        assert_eq!(svc.repo().rows().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_cached_rate_is_a_miss() {
        let cache = MockCache::with_entries(&[("eur-rate-USD", "n/a"), ("eur-rate-BRL", "5.5")]);
        let svc = service(cache, eur_table(), MockRepo::default());

        let tx = svc.convert("USD", 1.0, "BRL", "u").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
        assert_eq!(svc.provider().calls(), 1);
        assert_eq!(
            svc.cache().backend().value("eur-rate-USD").as_deref(),
            Some("1.1")
        );
    }

    #[tokio::test]
    async fn test_custom_key_prefix() {
        let cache = MockCache::with_entries(&[("usd:USD", "1"), ("usd:BRL", "5")]);
        let config = ServiceConfig {
            rate_key_prefix: "usd:".into(),
            ..ServiceConfig::default()
        };
        let svc = CurrencyConverterService::new(
            cache,
            MockProvider::unavailable(),
            MockRepo::default(),
            config,
        );

        let tx = svc.convert("USD", 1.0, "BRL", "u").await.unwrap();

        assert!(approx(tx.rate_value, 5.0));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_conversions_by_user() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());
        svc.convert("USD", 1.0, "BRL", "alice").await.unwrap();
        svc.convert("USD", 2.0, "JPY", "bob").await.unwrap();
        svc.convert("BRL", 3.0, "USD", "alice").await.unwrap();

        let alice = svc.get_conversions(Some("alice")).await.unwrap();

        let values: Vec<f64> = alice.iter().map(|tx| tx.source_currency_value).collect();
        assert_eq!(values, vec![1.0, 3.0]);
    }

    #[tokio::test]
    async fn test_get_conversions_unknown_user_is_empty() {
        let svc = service(MockCache::default(), eur_table(), MockRepo::default());
        svc.convert("USD", 1.0, "BRL", "alice").await.unwrap();

        let none = svc.get_conversions(Some("nobody")).await.unwrap();

        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_get_conversions_all_is_bounded() {
        let config = ServiceConfig {
            list_limit: 2,
            ..ServiceConfig::default()
        };
        let svc = CurrencyConverterService::new(
            MockCache::default(),
            eur_table(),
            MockRepo::default(),
            config,
        );
        for user in ["a", "b", "c"] {
            svc.convert("USD", 1.0, "BRL", user).await.unwrap();
        }

        let all = svc.get_conversions(None).await.unwrap();

        assert_eq!(all.len(), 2);
        assert!(all[0].datetime <= Utc::now());
    }
}
