use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::rates_model::{ExchangeRate, NewExchangeRate, RatePair};
use crate::errors::Result;

/// Trait defining the contract for the durable exchange rate store.
#[async_trait]
pub trait RateRepositoryTrait: Send + Sync {
    /// Most recent stored rate for a currency on the given day, if any.
    fn get_rate_for_date(
        &self,
        currency_code: &str,
        date: NaiveDate,
    ) -> Result<Option<ExchangeRate>>;

    /// Most recent stored rate for a currency regardless of date.
    fn get_latest_rate(&self, currency_code: &str) -> Result<Option<ExchangeRate>>;

    async fn save_rate(&self, rate: NewExchangeRate) -> Result<ExchangeRate>;
}

/// Trait defining the contract for exchange rate lookups.
///
/// Rates are quoted as UAH per one unit of the requested currency, and are
/// always positive; a currency with no obtainable rate is an error, never a
/// zero.
#[async_trait]
pub trait RateServiceTrait: Send + Sync {
    /// Today's rate for one currency.
    async fn rate(&self, currency_code: &str) -> Result<Decimal>;

    /// Both tracked rates in one call.
    async fn rate_pair(&self) -> Result<RatePair>;

    /// UAH-mediated cross rate: multiplying an amount in `source` by the
    /// result converts it to `target`.
    async fn cross_rate(&self, source: &str, target: &str) -> Result<Decimal>;
}
