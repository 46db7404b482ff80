use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Oldest vehicle year accepted; older vehicles fail the Euro-2 emission
/// floor and cannot be imported.
pub const MIN_VEHICLE_YEAR: i32 = 1996;

/// Battery capacity ceiling for electric vehicles, in kWh.
pub const MAX_ELECTRIC_CAPACITY_KWH: i32 = 300;

/// Displacement ceiling for combustion engines, in cm3.
pub const MAX_ENGINE_CAPACITY_CC: i32 = 10_000;

/// Vehicle propulsion type.
///
/// `autoria_id` values follow the AutoRia catalog so the variant can be
/// passed straight through as a market query filter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Gas,
    GasPetrol,
    Hybrid,
    Electric,
}

impl FuelType {
    /// AutoRia `fuel_id` query value for this fuel.
    pub fn autoria_id(&self) -> i32 {
        match self {
            FuelType::Petrol => 1,
            FuelType::Diesel => 2,
            FuelType::Gas => 3,
            FuelType::GasPetrol => 4,
            FuelType::Hybrid => 5,
            FuelType::Electric => 6,
        }
    }

    /// Stable lowercase name, also the storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Gas => "gas",
            FuelType::GasPetrol => "gasPetrol",
            FuelType::Hybrid => "hybrid",
            FuelType::Electric => "electric",
        }
    }
}

impl std::str::FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol" => Ok(FuelType::Petrol),
            "diesel" => Ok(FuelType::Diesel),
            "gas" => Ok(FuelType::Gas),
            "gasPetrol" => Ok(FuelType::GasPetrol),
            "hybrid" => Ok(FuelType::Hybrid),
            "electric" => Ok(FuelType::Electric),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown fuel type '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One calculation request as submitted by a client.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// AutoRia brand id.
    pub brand_id: i32,
    /// AutoRia model id.
    pub model_id: i32,
    /// Production year.
    pub year: i32,
    pub fuel_type: FuelType,
    /// Displacement in cm3, or battery capacity in kWh for electric vehicles.
    pub engine_capacity: i32,
    /// Declared purchase price in EUR.
    pub price_eur: Decimal,
    /// Anonymous client identity; generated by the server when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl CalculationRequest {
    /// Checks the request bounds before any network or database work.
    /// Messages name the offending field as the client sent it.
    pub fn validate(&self, current_year: i32) -> Result<(), ValidationError> {
        if self.brand_id <= 0 {
            return Err(ValidationError::InvalidInput(
                "brandId must be a positive catalog identifier".to_string(),
            ));
        }
        if self.model_id <= 0 {
            return Err(ValidationError::InvalidInput(
                "modelId must be a positive catalog identifier".to_string(),
            ));
        }

        let max_year = current_year + 1;
        if self.year < MIN_VEHICLE_YEAR || self.year > max_year {
            return Err(ValidationError::InvalidInput(format!(
                "year must be between {} and {}",
                MIN_VEHICLE_YEAR, max_year
            )));
        }

        if self.engine_capacity < 1 {
            return Err(ValidationError::InvalidInput(
                "engineCapacity must be at least 1".to_string(),
            ));
        }
        match self.fuel_type {
            FuelType::Electric => {
                if self.engine_capacity > MAX_ELECTRIC_CAPACITY_KWH {
                    return Err(ValidationError::InvalidInput(format!(
                        "engineCapacity must not exceed {} kWh for electric vehicles",
                        MAX_ELECTRIC_CAPACITY_KWH
                    )));
                }
            }
            _ => {
                if self.engine_capacity > MAX_ENGINE_CAPACITY_CC {
                    return Err(ValidationError::InvalidInput(format!(
                        "engineCapacity must not exceed {} cm3",
                        MAX_ENGINE_CAPACITY_CC
                    )));
                }
            }
        }

        if self.price_eur <= dec!(100) {
            return Err(ValidationError::InvalidInput(
                "priceEur must exceed 100".to_string(),
            ));
        }
        if self.price_eur > dec!(10_000_000) {
            return Err(ValidationError::InvalidInput(
                "priceEur must not exceed 10000000".to_string(),
            ));
        }

        Ok(())
    }
}

/// The full cost breakdown returned to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOutcome {
    pub import_duty: Decimal,
    pub excise_tax: Decimal,
    pub vat: Decimal,
    pub pension_fund: Decimal,
    /// Sum of all four taxes.
    pub total_taxes: Decimal,
    /// Declared price plus all taxes.
    pub turnkey_price: Decimal,
    /// Market average converted to EUR; zero when the market had no answer.
    pub market_price: Decimal,
    /// Market price minus the turnkey price.
    pub potential_profit: Decimal,
    pub is_profitable: bool,
    /// The EUR rate (UAH per EUR) the calculation was priced with.
    pub currency_rate_used: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CalculationRequest {
        CalculationRequest {
            brand_id: 79,
            model_id: 2104,
            year: 2018,
            fuel_type: FuelType::Petrol,
            engine_capacity: 1998,
            price_eur: dec!(15000),
            device_id: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request().validate(2025).is_ok());
    }

    #[test]
    fn test_year_bounds() {
        let mut too_old = request();
        too_old.year = 1995;
        assert!(too_old.validate(2025).is_err());

        let mut next_year = request();
        next_year.year = 2026;
        assert!(next_year.validate(2025).is_ok());

        let mut far_future = request();
        far_future.year = 2027;
        assert!(far_future.validate(2025).is_err());
    }

    #[test]
    fn test_capacity_bounds_depend_on_fuel() {
        let mut zero = request();
        zero.engine_capacity = 0;
        assert!(zero.validate(2025).is_err());

        let mut huge_engine = request();
        huge_engine.engine_capacity = 10_001;
        assert!(huge_engine.validate(2025).is_err());

        let mut big_battery = request();
        big_battery.fuel_type = FuelType::Electric;
        big_battery.engine_capacity = 301;
        assert!(big_battery.validate(2025).is_err());

        let mut ok_battery = request();
        ok_battery.fuel_type = FuelType::Electric;
        ok_battery.engine_capacity = 300;
        assert!(ok_battery.validate(2025).is_ok());
    }

    #[test]
    fn test_price_bounds() {
        let mut cheap = request();
        cheap.price_eur = dec!(100);
        assert!(cheap.validate(2025).is_err());

        let mut expensive = request();
        expensive.price_eur = dec!(10_000_001);
        assert!(expensive.validate(2025).is_err());
    }

    #[test]
    fn test_reference_ids_must_be_positive() {
        let mut no_brand = request();
        no_brand.brand_id = 0;
        assert!(no_brand.validate(2025).is_err());

        let mut no_model = request();
        no_model.model_id = -5;
        assert!(no_model.validate(2025).is_err());
    }

    #[test]
    fn test_error_message_names_the_field() {
        let mut bad = request();
        bad.price_eur = dec!(50);

        let err = bad.validate(2025).unwrap_err();
        assert!(err.to_string().contains("priceEur"));
    }

    #[test]
    fn test_fuel_type_round_trips_through_storage_name() {
        for fuel in [
            FuelType::Petrol,
            FuelType::Diesel,
            FuelType::Gas,
            FuelType::GasPetrol,
            FuelType::Hybrid,
            FuelType::Electric,
        ] {
            assert_eq!(fuel.as_str().parse::<FuelType>().unwrap(), fuel);
        }
        assert!("kerosene".parse::<FuelType>().is_err());
    }

    #[test]
    fn test_fuel_type_serde_names_match_storage_names() {
        let json = serde_json::to_string(&FuelType::GasPetrol).unwrap();
        assert_eq!(json, "\"gasPetrol\"");

        let parsed: FuelType = serde_json::from_str("\"electric\"").unwrap();
        assert_eq!(parsed, FuelType::Electric);
    }
}
