//! Database models for stored exchange rates.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use clearcost_core::rates::{ExchangeRate, NewExchangeRate};

/// Database model for one stored rate. Decimals and dates live in TEXT
/// columns; SQLite has no exact numeric type with the scale rates need.
#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::currency_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRateDB {
    pub id: i32,
    pub currency_code: String,
    pub rate: String,
    pub effective_date: String,
}

/// Database model for inserting a rate; the id comes from the database.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::currency_rates)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrencyRateDB {
    pub currency_code: String,
    pub rate: String,
    pub effective_date: String,
}

// Conversion to domain models
impl From<CurrencyRateDB> for ExchangeRate {
    fn from(db: CurrencyRateDB) -> Self {
        ExchangeRate {
            id: db.id,
            currency_code: db.currency_code,
            rate: Decimal::from_str(&db.rate).unwrap_or_default(),
            effective_date: NaiveDate::parse_from_str(&db.effective_date, "%Y-%m-%d")
                .unwrap_or_default(),
        }
    }
}

impl From<NewExchangeRate> for NewCurrencyRateDB {
    fn from(domain: NewExchangeRate) -> Self {
        Self {
            currency_code: domain.currency_code,
            rate: domain.rate.to_string(),
            effective_date: domain.effective_date.format("%Y-%m-%d").to_string(),
        }
    }
}
