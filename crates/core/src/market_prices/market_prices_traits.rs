use async_trait::async_trait;
use rust_decimal::Decimal;

use clearcost_market_data::CatalogModel;

use crate::customs::FuelType;
use crate::errors::Result;

/// Trait defining the contract for market price lookups.
///
/// Market data is advisory: when the upstream cannot answer, `models`
/// returns an empty list and `average_price` returns zero instead of
/// failing, and the degraded answer is cached only briefly so the upstream
/// is retried soon.
#[async_trait]
pub trait MarketPriceServiceTrait: Send + Sync {
    /// Models the upstream catalog lists for a brand.
    async fn models(&self, brand_id: i32) -> Result<Vec<CatalogModel>>;

    /// Interquartile-mean market price in USD for a brand/model/year query,
    /// zero when the market has no answer.
    async fn average_price(
        &self,
        brand_id: i32,
        model_id: i32,
        year: i32,
        fuel: Option<FuelType>,
    ) -> Result<Decimal>;
}
