use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::customs::FuelType;

/// One persisted calculation, immutable once written.
///
/// `brand_id`/`model_id` are kept only when the dictionary knew (or could
/// materialize) the reference at calculation time; the monetary snapshot
/// stands on its own either way.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: i32,
    pub device_id: String,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub year: i32,
    pub fuel_type: FuelType,
    pub engine_capacity: i32,
    pub price_eur: Decimal,
    pub total_taxes: Decimal,
    pub turnkey_price: Decimal,
    pub market_price_snapshot: Decimal,
    pub potential_profit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A record about to be persisted; the store assigns id and timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewCalculationRecord {
    pub device_id: String,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub year: i32,
    pub fuel_type: FuelType,
    pub engine_capacity: i32,
    pub price_eur: Decimal,
    pub total_taxes: Decimal,
    pub turnkey_price: Decimal,
    pub market_price_snapshot: Decimal,
    pub potential_profit: Decimal,
}
