//! Wire-facing domain types shared by the upstream clients.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One currency rate as quoted by the rate upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    /// ISO 4217 code, e.g. "EUR".
    pub currency_code: String,
    /// Units of the local currency per one unit of `currency_code`.
    pub rate: Decimal,
    /// The date the upstream declared the rate effective for.
    pub effective_date: NaiveDate,
}

/// A vehicle model as listed in the upstream catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogModel {
    /// Catalog identifier (externally assigned, reused as our key).
    pub id: i32,
    /// Display name, e.g. "Corolla".
    pub name: String,
}

/// Query parameters for an average market price lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AveragePriceQuery {
    pub brand_id: i32,
    pub model_id: i32,
    pub year: i32,
    /// Upstream fuel filter, when the caller wants one.
    pub fuel_id: Option<i32>,
}

/// Aggregated market price answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AveragePrice {
    /// Interquartile mean over current listings, in USD.
    pub price_usd: Decimal,
    /// Number of listings behind the aggregate.
    pub sample_count: i64,
}
