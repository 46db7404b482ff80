use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use clearcost_market_data::{
    AveragePriceQuery, CatalogModel, ResiliencePolicy, TtlCache, UpstreamError,
    VehicleMarketProvider,
};

use super::market_prices_traits::MarketPriceServiceTrait;
use crate::customs::FuelType;
use crate::errors::Result;

/// How long cached market answers live.
///
/// Successful answers are good for a day. Degraded answers get a short
/// cooldown so the upstream is retried soon, with a longer one when it
/// asked us to back off.
#[derive(Clone, Debug)]
pub struct MarketPriceCacheConfig {
    pub success_ttl: Duration,
    pub rate_limit_cooldown: Duration,
    pub failure_cooldown: Duration,
}

impl Default for MarketPriceCacheConfig {
    fn default() -> Self {
        Self {
            success_ttl: Duration::from_secs(24 * 60 * 60),
            rate_limit_cooldown: Duration::from_secs(5 * 60),
            failure_cooldown: Duration::from_secs(60),
        }
    }
}

/// Cached catalog and market price lookups over the vehicle market upstream.
pub struct MarketPriceService {
    provider: Arc<dyn VehicleMarketProvider>,
    policy: Arc<ResiliencePolicy>,
    cache_config: MarketPriceCacheConfig,
    price_cache: TtlCache<Decimal>,
    model_cache: TtlCache<Vec<CatalogModel>>,
}

impl MarketPriceService {
    pub fn new(provider: Arc<dyn VehicleMarketProvider>, policy: Arc<ResiliencePolicy>) -> Self {
        Self::with_cache_config(provider, policy, MarketPriceCacheConfig::default())
    }

    pub fn with_cache_config(
        provider: Arc<dyn VehicleMarketProvider>,
        policy: Arc<ResiliencePolicy>,
        cache_config: MarketPriceCacheConfig,
    ) -> Self {
        Self {
            provider,
            policy,
            cache_config,
            price_cache: TtlCache::new(),
            model_cache: TtlCache::new(),
        }
    }

    fn price_key(brand_id: i32, model_id: i32, year: i32, fuel: Option<FuelType>) -> String {
        match fuel {
            Some(fuel) => format!(
                "price-{}-{}-{}-{}",
                brand_id,
                model_id,
                year,
                fuel.autoria_id()
            ),
            None => format!("price-{}-{}-{}", brand_id, model_id, year),
        }
    }

    fn degraded_ttl(&self, err: &UpstreamError) -> Duration {
        if err.is_rate_limited() {
            self.cache_config.rate_limit_cooldown
        } else {
            self.cache_config.failure_cooldown
        }
    }
}

#[async_trait]
impl MarketPriceServiceTrait for MarketPriceService {
    async fn models(&self, brand_id: i32) -> Result<Vec<CatalogModel>> {
        let key = format!("models-{}", brand_id);
        if let Some(models) = self.model_cache.get(&key) {
            return Ok(models);
        }

        let provider = Arc::clone(&self.provider);
        let outcome = self
            .policy
            .execute(provider.target(), || {
                let provider = Arc::clone(&provider);
                async move { provider.models_of_brand(brand_id).await }
            })
            .await;

        match outcome {
            Ok(models) if !models.is_empty() => {
                self.model_cache
                    .insert(key, models.clone(), self.cache_config.success_ttl);
                Ok(models)
            }
            Ok(_) => {
                log::warn!("upstream lists no models for brand {}", brand_id);
                self.model_cache
                    .insert(key, Vec::new(), self.cache_config.failure_cooldown);
                Ok(Vec::new())
            }
            Err(err) => {
                log::warn!("model list for brand {} unavailable: {}", brand_id, err);
                self.model_cache
                    .insert(key, Vec::new(), self.degraded_ttl(&err));
                Ok(Vec::new())
            }
        }
    }

    async fn average_price(
        &self,
        brand_id: i32,
        model_id: i32,
        year: i32,
        fuel: Option<FuelType>,
    ) -> Result<Decimal> {
        let key = Self::price_key(brand_id, model_id, year, fuel);
        if let Some(price) = self.price_cache.get(&key) {
            return Ok(price);
        }

        let query = AveragePriceQuery {
            brand_id,
            model_id,
            year,
            fuel_id: fuel.map(|f| f.autoria_id()),
        };

        let provider = Arc::clone(&self.provider);
        let outcome = self
            .policy
            .execute(provider.target(), || {
                let provider = Arc::clone(&provider);
                let query = query.clone();
                async move { provider.average_price(&query).await }
            })
            .await;

        match outcome {
            Ok(aggregate) if aggregate.sample_count > 0 && aggregate.price_usd > Decimal::ZERO => {
                self.price_cache
                    .insert(key, aggregate.price_usd, self.cache_config.success_ttl);
                Ok(aggregate.price_usd)
            }
            Ok(aggregate) => {
                log::warn!(
                    "no listings behind market price for brand {} model {} year {} (samples: {})",
                    brand_id,
                    model_id,
                    year,
                    aggregate.sample_count
                );
                self.price_cache
                    .insert(key, Decimal::ZERO, self.cache_config.failure_cooldown);
                Ok(Decimal::ZERO)
            }
            Err(err) => {
                log::warn!(
                    "market price for brand {} model {} year {} unavailable: {}",
                    brand_id,
                    model_id,
                    year,
                    err
                );
                self.price_cache
                    .insert(key, Decimal::ZERO, self.degraded_ttl(&err));
                Ok(Decimal::ZERO)
            }
        }
    }
}
