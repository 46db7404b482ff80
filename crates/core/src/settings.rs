//! Statutory customs rates and thresholds.
//!
//! One immutable value constructed at startup and shared via `Arc`. The
//! defaults carry the current statutory figures; deployments override them
//! through configuration when the statute changes, the calculation engine
//! never hardcodes a rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tax rates and thresholds used by the customs calculation engine.
///
/// Monetary rates are in EUR unless the field says otherwise; the pension
/// fund thresholds are in UAH because the statute defines them that way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomsSettings {
    /// Import duty as a fraction of the declared price (0.10 = 10%).
    pub import_duty_rate: Decimal,
    /// VAT as a fraction of price + duty + excise (0.20 = 20%).
    pub vat_rate: Decimal,

    /// Excise per 1000 cm3 per year of age, petrol engines at or below
    /// [`petrol_volume_threshold`](Self::petrol_volume_threshold).
    pub petrol_rate_small: Decimal,
    /// Excise per 1000 cm3 per year of age, petrol engines above the threshold.
    pub petrol_rate_large: Decimal,
    /// Petrol displacement threshold in cm3, inclusive upper bound of the
    /// small-rate band.
    pub petrol_volume_threshold: i32,

    /// Excise per 1000 cm3 per year of age, diesel engines at or below
    /// [`diesel_volume_threshold`](Self::diesel_volume_threshold).
    pub diesel_rate_small: Decimal,
    /// Excise per 1000 cm3 per year of age, diesel engines above the threshold.
    pub diesel_rate_large: Decimal,
    /// Diesel displacement threshold in cm3, inclusive.
    pub diesel_volume_threshold: i32,

    /// Flat excise for hybrids, independent of displacement and age.
    pub hybrid_rate: Decimal,
    /// Excise per kWh of battery capacity for electric vehicles.
    pub electric_rate: Decimal,
    /// Vehicle age cap for the excise age coefficient, in years.
    pub max_excise_age: i32,

    /// Upper bound of the low pension band, in UAH (165 subsistence minimums).
    pub pension_threshold_tier1: Decimal,
    /// Upper bound of the medium pension band, in UAH (290 subsistence minimums).
    pub pension_threshold_tier2: Decimal,
    /// Pension fund fraction below tier 1.
    pub pension_rate_low: Decimal,
    /// Pension fund fraction between tier 1 and tier 2.
    pub pension_rate_medium: Decimal,
    /// Pension fund fraction above tier 2.
    pub pension_rate_high: Decimal,

    /// Electric vehicles pay no VAT while this is set.
    pub electric_vat_exempt: bool,
    /// Electric vehicles pay no pension fund fee while this is set.
    pub electric_pension_exempt: bool,
}

impl Default for CustomsSettings {
    fn default() -> Self {
        Self {
            import_duty_rate: dec!(0.10),
            vat_rate: dec!(0.20),
            petrol_rate_small: dec!(50),
            petrol_rate_large: dec!(100),
            petrol_volume_threshold: 3000,
            diesel_rate_small: dec!(75),
            diesel_rate_large: dec!(150),
            diesel_volume_threshold: 3500,
            hybrid_rate: dec!(100),
            electric_rate: dec!(1),
            max_excise_age: 15,
            pension_threshold_tier1: dec!(499620),
            pension_threshold_tier2: dec!(878120),
            pension_rate_low: dec!(0.03),
            pension_rate_medium: dec!(0.04),
            pension_rate_high: dec!(0.05),
            electric_vat_exempt: true,
            electric_pension_exempt: true,
        }
    }
}
