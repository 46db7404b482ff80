//! Upstream client trait definitions.
//!
//! Two small seams: one for the currency-rate upstream, one for the vehicle
//! catalog/market upstream. The domain layer depends on these traits, never
//! on the concrete HTTP clients, so tests substitute in-memory doubles.

use async_trait::async_trait;

use crate::errors::UpstreamError;
use crate::models::{AveragePrice, AveragePriceQuery, CatalogModel, RateQuote};

/// A source of official currency rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable identifier used for logging and circuit breaker tracking.
    fn target(&self) -> &'static str;

    /// Fetch the current rate for one currency against the local currency.
    ///
    /// Implementations return whatever the upstream currently publishes;
    /// validity checks (positive rate, freshness) belong to the caller.
    async fn current_rate(&self, currency_code: &str) -> Result<RateQuote, UpstreamError>;
}

/// A source of vehicle catalog entries and market price aggregates.
#[async_trait]
pub trait VehicleMarketProvider: Send + Sync {
    /// Stable identifier used for logging and circuit breaker tracking.
    fn target(&self) -> &'static str;

    /// List the models the catalog knows for a brand.
    async fn models_of_brand(&self, brand_id: i32) -> Result<Vec<CatalogModel>, UpstreamError>;

    /// Fetch the aggregated market price for a brand/model/year query.
    async fn average_price(&self, query: &AveragePriceQuery)
        -> Result<AveragePrice, UpstreamError>;
}
