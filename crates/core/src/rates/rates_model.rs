use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One stored exchange rate: UAH per one unit of `currency_code`, effective
/// for one calendar day (UTC). Rows are append-only; readers pick the most
/// recent by date, then id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub id: i32,
    pub currency_code: String,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
}

/// A rate about to be persisted; the store assigns the id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewExchangeRate {
    pub currency_code: String,
    pub rate: Decimal,
    pub effective_date: NaiveDate,
}

/// The two tracked rates served together, stamped with when they were read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatePair {
    pub eur: Decimal,
    pub usd: Decimal,
    pub date: DateTime<Utc>,
}
