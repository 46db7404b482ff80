//! Database models for persisted calculations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use clearcost_core::customs::FuelType;
use clearcost_core::history::{CalculationRecord, NewCalculationRecord};

/// Database model for one stored calculation. Money lives in TEXT columns
/// (exact decimal strings), timestamps in RFC 3339 TEXT.
#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::calculation_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecordDB {
    pub id: i32,
    pub device_id: String,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub year: i32,
    pub fuel_type: String,
    pub engine_capacity: i32,
    pub price_eur: String,
    pub total_taxes: String,
    pub turnkey_price: String,
    pub market_price_snapshot: String,
    pub potential_profit: String,
    pub created_at: String,
}

/// Database model for inserting a record; id comes from the database and
/// `created_at` is stamped by the repository at write time.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::calculation_records)]
#[serde(rename_all = "camelCase")]
pub struct NewCalculationRecordDB {
    pub device_id: String,
    pub brand_id: Option<i32>,
    pub model_id: Option<i32>,
    pub year: i32,
    pub fuel_type: String,
    pub engine_capacity: i32,
    pub price_eur: String,
    pub total_taxes: String,
    pub turnkey_price: String,
    pub market_price_snapshot: String,
    pub potential_profit: String,
    pub created_at: String,
}

impl NewCalculationRecordDB {
    pub fn from_domain(domain: NewCalculationRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            device_id: domain.device_id,
            brand_id: domain.brand_id,
            model_id: domain.model_id,
            year: domain.year,
            fuel_type: domain.fuel_type.as_str().to_string(),
            engine_capacity: domain.engine_capacity,
            price_eur: domain.price_eur.to_string(),
            total_taxes: domain.total_taxes.to_string(),
            turnkey_price: domain.turnkey_price.to_string(),
            market_price_snapshot: domain.market_price_snapshot.to_string(),
            potential_profit: domain.potential_profit.to_string(),
            created_at: created_at.to_rfc3339(),
        }
    }
}

// Fuel names and timestamps are written by this crate, so a parse failure
// here means the row was edited outside the application; surface it rather
// than guessing.
impl TryFrom<CalculationRecordDB> for CalculationRecord {
    type Error = clearcost_core::Error;

    fn try_from(db: CalculationRecordDB) -> Result<Self, Self::Error> {
        let fuel_type = FuelType::from_str(&db.fuel_type)?;
        let created_at = DateTime::parse_from_rfc3339(&db.created_at)?.with_timezone(&Utc);

        Ok(CalculationRecord {
            id: db.id,
            device_id: db.device_id,
            brand_id: db.brand_id,
            model_id: db.model_id,
            year: db.year,
            fuel_type,
            engine_capacity: db.engine_capacity,
            price_eur: Decimal::from_str(&db.price_eur)?,
            total_taxes: Decimal::from_str(&db.total_taxes)?,
            turnkey_price: Decimal::from_str(&db.turnkey_price)?,
            market_price_snapshot: Decimal::from_str(&db.market_price_snapshot)?,
            potential_profit: Decimal::from_str(&db.potential_profit)?,
            created_at,
        })
    }
}
