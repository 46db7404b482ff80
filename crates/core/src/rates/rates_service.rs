use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use clearcost_market_data::{RateProvider, ResiliencePolicy, TtlCache, UpstreamError};

use super::rates_model::{NewExchangeRate, RatePair};
use super::rates_traits::{RateRepositoryTrait, RateServiceTrait};
use crate::constants::{EUR, USD};
use crate::errors::{Error, Result};

/// Floor for the memory-tier TTL, and the cooldown applied when the value
/// being cached is a stale fallback rather than today's rate.
const MIN_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Daily exchange rate lookups over three tiers: process memory, the
/// durable store, and the upstream provider behind the resilience policy.
///
/// A day's rate is immutable once published, so the memory tier is keyed by
/// currency and UTC date and expires at the next UTC midnight. When the
/// upstream cannot be reached the most recent stored rate of any date is
/// served instead, cached only briefly so recovery is picked up quickly.
#[derive(Clone)]
pub struct RateService {
    repository: Arc<dyn RateRepositoryTrait>,
    provider: Arc<dyn RateProvider>,
    policy: Arc<ResiliencePolicy>,
    cache: Arc<TtlCache<Decimal>>,
}

impl RateService {
    pub fn new(
        repository: Arc<dyn RateRepositoryTrait>,
        provider: Arc<dyn RateProvider>,
        policy: Arc<ResiliencePolicy>,
    ) -> Self {
        Self {
            repository,
            provider,
            policy,
            cache: Arc::new(TtlCache::new()),
        }
    }

    fn cache_key(currency_code: &str, date: NaiveDate) -> String {
        format!("{}-{}", currency_code, date.format("%Y%m%d"))
    }

    /// Time until the next UTC midnight, floored at [`MIN_CACHE_TTL`] so a
    /// fetch just before midnight is not immediately re-fetched.
    fn ttl_until_midnight(now: DateTime<Utc>) -> Duration {
        let next_midnight = now
            .date_naive()
            .succ_opt()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|naive| Utc.from_utc_datetime(&naive));

        match next_midnight {
            Some(midnight) => (midnight - now)
                .to_std()
                .unwrap_or(MIN_CACHE_TTL)
                .max(MIN_CACHE_TTL),
            None => MIN_CACHE_TTL,
        }
    }

    /// One guarded upstream round-trip. A non-positive rate is reported as
    /// an upstream failure so the caller falls through to the stored tier.
    async fn fetch_upstream(&self, currency_code: &str) -> std::result::Result<Decimal, UpstreamError> {
        let provider = Arc::clone(&self.provider);
        let code = currency_code.to_string();

        let quote = self
            .policy
            .execute(provider.target(), || {
                let provider = Arc::clone(&provider);
                let code = code.clone();
                async move { provider.current_rate(&code).await }
            })
            .await?;

        if quote.rate <= Decimal::ZERO {
            return Err(UpstreamError::InvalidPayload {
                target: self.provider.target().to_string(),
                message: format!("non-positive rate {} for {}", quote.rate, currency_code),
            });
        }

        log::debug!(
            "fetched {} rate {} (upstream effective date {})",
            currency_code,
            quote.rate,
            quote.effective_date
        );

        Ok(quote.rate)
    }

    /// Serve the most recent stored rate of any date, or surface the
    /// upstream failure when nothing is stored at all.
    fn last_known_good(
        &self,
        currency_code: &str,
        key: &str,
        upstream_err: UpstreamError,
    ) -> Result<Decimal> {
        match self.repository.get_latest_rate(currency_code)? {
            Some(stored) => {
                log::warn!(
                    "upstream rate fetch for {} failed ({}); serving stored rate {} from {}",
                    currency_code,
                    upstream_err,
                    stored.rate,
                    stored.effective_date
                );
                self.cache.insert(key, stored.rate, MIN_CACHE_TTL);
                Ok(stored.rate)
            }
            None => {
                log::error!(
                    "no rate available for {}: upstream failed and nothing stored",
                    currency_code
                );
                Err(Error::RatesUnavailable {
                    currency: currency_code.to_string(),
                    reason: upstream_err.to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl RateServiceTrait for RateService {
    async fn rate(&self, currency_code: &str) -> Result<Decimal> {
        let now = Utc::now();
        let today = now.date_naive();
        let key = Self::cache_key(currency_code, today);

        if let Some(rate) = self.cache.get(&key) {
            return Ok(rate);
        }

        if let Some(stored) = self.repository.get_rate_for_date(currency_code, today)? {
            self.cache
                .insert(key, stored.rate, Self::ttl_until_midnight(now));
            return Ok(stored.rate);
        }

        match self.fetch_upstream(currency_code).await {
            Ok(rate) => {
                self.repository
                    .save_rate(NewExchangeRate {
                        currency_code: currency_code.to_string(),
                        rate,
                        effective_date: today,
                    })
                    .await?;
                self.cache.insert(key, rate, Self::ttl_until_midnight(now));
                Ok(rate)
            }
            Err(err) => self.last_known_good(currency_code, &key, err),
        }
    }

    async fn rate_pair(&self) -> Result<RatePair> {
        let eur = self.rate(EUR).await?;
        let usd = self.rate(USD).await?;

        Ok(RatePair {
            eur,
            usd,
            date: Utc::now(),
        })
    }

    async fn cross_rate(&self, source: &str, target: &str) -> Result<Decimal> {
        if source == target {
            return Ok(Decimal::ONE);
        }

        let source_rate = self.rate(source).await?;
        let target_rate = self.rate(target).await?;

        // Both rates are UAH per unit: source -> UAH -> target.
        Ok(source_rate / target_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use clearcost_market_data::{CircuitBreakerConfig, RateQuote, ResilienceConfig};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use crate::rates::rates_model::ExchangeRate;

    struct MemoryRateRepository {
        rows: Mutex<Vec<ExchangeRate>>,
    }

    impl MemoryRateRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }

        fn with_rows(rows: Vec<ExchangeRate>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RateRepositoryTrait for MemoryRateRepository {
        fn get_rate_for_date(
            &self,
            currency_code: &str,
            date: NaiveDate,
        ) -> Result<Option<ExchangeRate>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.currency_code == currency_code && r.effective_date == date)
                .max_by_key(|r| r.id)
                .cloned())
        }

        fn get_latest_rate(&self, currency_code: &str) -> Result<Option<ExchangeRate>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|r| r.currency_code == currency_code)
                .max_by_key(|r| (r.effective_date, r.id))
                .cloned())
        }

        async fn save_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate> {
            let mut rows = self.rows.lock().unwrap();
            let row = ExchangeRate {
                id: rows.len() as i32 + 1,
                currency_code: rate.currency_code,
                rate: rate.rate,
                effective_date: rate.effective_date,
            };
            rows.push(row.clone());
            Ok(row)
        }
    }

    /// Returns a fixed quote for every currency, or a 503 when constructed
    /// as failing. Counts upstream calls.
    struct ScriptedProvider {
        rate: Option<Decimal>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn succeeding(rate: Decimal) -> Self {
            Self {
                rate: Some(rate),
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                rate: None,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for ScriptedProvider {
        fn target(&self) -> &'static str {
            "TEST_RATES"
        }

        async fn current_rate(
            &self,
            currency_code: &str,
        ) -> std::result::Result<RateQuote, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.rate {
                Some(rate) => Ok(RateQuote {
                    currency_code: currency_code.to_string(),
                    rate,
                    effective_date: Utc::now().date_naive(),
                }),
                None => Err(UpstreamError::Status {
                    target: "TEST_RATES".to_string(),
                    code: 503,
                }),
            }
        }
    }

    fn fast_policy() -> Arc<ResiliencePolicy> {
        Arc::new(ResiliencePolicy::with_config(ResilienceConfig {
            overall_timeout: Duration::from_secs(1),
            max_retries: 1,
            backoff_base: Duration::from_millis(1),
            breaker: CircuitBreakerConfig::default(),
        }))
    }

    fn service(
        repository: Arc<MemoryRateRepository>,
        provider: Arc<ScriptedProvider>,
    ) -> RateService {
        RateService::new(repository, provider, fast_policy())
    }

    fn today_row(id: i32, code: &str, rate: Decimal) -> ExchangeRate {
        ExchangeRate {
            id,
            currency_code: code.to_string(),
            rate,
            effective_date: Utc::now().date_naive(),
        }
    }

    fn dated_row(id: i32, code: &str, rate: Decimal, days_ago: i64) -> ExchangeRate {
        ExchangeRate {
            id,
            currency_code: code.to_string(),
            rate,
            effective_date: Utc::now().date_naive() - chrono::Duration::days(days_ago),
        }
    }

    #[tokio::test]
    async fn test_second_call_within_a_day_hits_memory() {
        let repository = Arc::new(MemoryRateRepository::new());
        let provider = Arc::new(ScriptedProvider::succeeding(dec!(48.50)));
        let service = service(repository, Arc::clone(&provider));

        assert_eq!(service.rate(EUR).await.unwrap(), dec!(48.50));
        assert_eq!(service.rate(EUR).await.unwrap(), dec!(48.50));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_stored_today_row_avoids_upstream() {
        let repository = Arc::new(MemoryRateRepository::with_rows(vec![today_row(
            1,
            EUR,
            dec!(48.20),
        )]));
        let provider = Arc::new(ScriptedProvider::succeeding(dec!(99)));
        let service = service(repository, Arc::clone(&provider));

        assert_eq!(service.rate(EUR).await.unwrap(), dec!(48.20));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_success_is_persisted() {
        let repository = Arc::new(MemoryRateRepository::new());
        let provider = Arc::new(ScriptedProvider::succeeding(dec!(41.05)));
        let service = service(Arc::clone(&repository), provider);

        assert_eq!(service.rate(USD).await.unwrap(), dec!(41.05));
        assert_eq!(repository.row_count(), 1);

        let stored = repository
            .get_rate_for_date(USD, Utc::now().date_naive())
            .unwrap()
            .unwrap();
        assert_eq!(stored.rate, dec!(41.05));
    }

    #[tokio::test]
    async fn test_upstream_failure_serves_last_known_good() {
        let repository = Arc::new(MemoryRateRepository::with_rows(vec![dated_row(
            1,
            EUR,
            dec!(47.90),
            3,
        )]));
        let provider = Arc::new(ScriptedProvider::failing());
        let service = service(Arc::clone(&repository), provider);

        assert_eq!(service.rate(EUR).await.unwrap(), dec!(47.90));
        // The stale value was not promoted to a durable today-row.
        assert_eq!(repository.row_count(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_upstream_rate_counts_as_failure() {
        let repository = Arc::new(MemoryRateRepository::with_rows(vec![dated_row(
            1,
            EUR,
            dec!(47.50),
            1,
        )]));
        let provider = Arc::new(ScriptedProvider::succeeding(dec!(0)));
        let service = service(repository, provider);

        assert_eq!(service.rate(EUR).await.unwrap(), dec!(47.50));
    }

    #[tokio::test]
    async fn test_no_rate_anywhere_is_fatal() {
        let repository = Arc::new(MemoryRateRepository::new());
        let provider = Arc::new(ScriptedProvider::failing());
        let service = service(repository, provider);

        let err = service.rate(EUR).await.unwrap_err();
        match err {
            Error::RatesUnavailable { currency, .. } => assert_eq!(currency, EUR),
            other => panic!("expected RatesUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cross_rate_converts_source_into_target() {
        let repository = Arc::new(MemoryRateRepository::with_rows(vec![
            today_row(1, EUR, dec!(50)),
            today_row(2, USD, dec!(40)),
        ]));
        let provider = Arc::new(ScriptedProvider::failing());
        let service = service(repository, provider);

        // 1 USD = 40 UAH = 40/50 EUR.
        assert_eq!(service.cross_rate(USD, EUR).await.unwrap(), dec!(0.8));
        assert_eq!(service.cross_rate(EUR, EUR).await.unwrap(), Decimal::ONE);
    }

    #[tokio::test]
    async fn test_rate_pair_returns_both_tracked_currencies() {
        let repository = Arc::new(MemoryRateRepository::with_rows(vec![
            today_row(1, EUR, dec!(48.50)),
            today_row(2, USD, dec!(41.00)),
        ]));
        let provider = Arc::new(ScriptedProvider::failing());
        let service = service(repository, provider);

        let pair = service.rate_pair().await.unwrap();
        assert_eq!(pair.eur, dec!(48.50));
        assert_eq!(pair.usd, dec!(41.00));
    }

    #[test]
    fn test_midnight_ttl_has_a_floor() {
        let late_evening = Utc.with_ymd_and_hms(2025, 6, 1, 23, 40, 0).unwrap();
        assert_eq!(RateService::ttl_until_midnight(late_evening), MIN_CACHE_TTL);

        let morning = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(
            RateService::ttl_until_midnight(morning),
            Duration::from_secs(14 * 60 * 60)
        );
    }
}
