use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::customs_model::{CalculationOutcome, CalculationRequest, FuelType};
use super::customs_traits::CustomsServiceTrait;
use crate::catalog::CatalogServiceTrait;
use crate::constants::{EUR, USD};
use crate::errors::Result;
use crate::history::{HistoryRepositoryTrait, NewCalculationRecord};
use crate::market_prices::MarketPriceServiceTrait;
use crate::rates::RateServiceTrait;
use crate::settings::CustomsSettings;

/// The customs calculation engine.
///
/// Prices an import out of four statutory components (import duty, excise,
/// VAT, pension fund) plus a market comparison, then persists the outcome
/// as a history record for the requesting device.
pub struct CustomsService {
    rates: Arc<dyn RateServiceTrait>,
    market_prices: Arc<dyn MarketPriceServiceTrait>,
    catalog: Arc<dyn CatalogServiceTrait>,
    history: Arc<dyn HistoryRepositoryTrait>,
    settings: Arc<CustomsSettings>,
}

impl CustomsService {
    pub fn new(
        rates: Arc<dyn RateServiceTrait>,
        market_prices: Arc<dyn MarketPriceServiceTrait>,
        catalog: Arc<dyn CatalogServiceTrait>,
        history: Arc<dyn HistoryRepositoryTrait>,
        settings: Arc<CustomsSettings>,
    ) -> Self {
        Self {
            rates,
            market_prices,
            catalog,
            history,
            settings,
        }
    }

    /// Excise by fuel type. Combustion engines pay per 1000 cm3 scaled by
    /// age, with the small/large rate split at an inclusive displacement
    /// threshold; hybrids pay a flat amount; electric vehicles pay per kWh.
    fn excise(&self, fuel: FuelType, capacity: i32, year: i32, current_year: i32) -> Decimal {
        let age = Decimal::from((current_year - year).max(1).min(self.settings.max_excise_age));
        let volume_coeff = Decimal::from(capacity) / dec!(1000);

        match fuel {
            FuelType::Petrol if capacity <= self.settings.petrol_volume_threshold => {
                self.settings.petrol_rate_small * volume_coeff * age
            }
            FuelType::Petrol => self.settings.petrol_rate_large * volume_coeff * age,
            FuelType::Diesel if capacity <= self.settings.diesel_volume_threshold => {
                self.settings.diesel_rate_small * volume_coeff * age
            }
            FuelType::Diesel => self.settings.diesel_rate_large * volume_coeff * age,
            FuelType::Hybrid => self.settings.hybrid_rate,
            FuelType::Electric => self.settings.electric_rate * Decimal::from(capacity),
            FuelType::Gas | FuelType::GasPetrol => Decimal::ZERO,
        }
    }

    /// Pension fund fee: the vehicle value in UAH picks one of three
    /// statutory bands, and the banded percentage of that value comes back
    /// converted to EUR.
    fn pension_fee(&self, price_eur: Decimal, eur_rate: Decimal) -> Decimal {
        let value_uah = price_eur * eur_rate;

        let percent = if value_uah <= self.settings.pension_threshold_tier1 {
            self.settings.pension_rate_low
        } else if value_uah <= self.settings.pension_threshold_tier2 {
            self.settings.pension_rate_medium
        } else {
            self.settings.pension_rate_high
        };

        value_uah * percent / eur_rate
    }
}

#[async_trait]
impl CustomsServiceTrait for CustomsService {
    async fn calculate(
        &self,
        request: CalculationRequest,
        device_id: &str,
    ) -> Result<CalculationOutcome> {
        let current_year = Utc::now().year();
        request.validate(current_year)?;

        let eur_rate = self.rates.rate(EUR).await?;
        // Market quotes come in USD; convert through UAH to EUR.
        let usd_to_eur = self.rates.cross_rate(USD, EUR).await?;

        let market_price_usd = self
            .market_prices
            .average_price(
                request.brand_id,
                request.model_id,
                request.year,
                Some(request.fuel_type),
            )
            .await?;

        let market_price_eur = market_price_usd * usd_to_eur;

        let is_electric = request.fuel_type == FuelType::Electric;

        let duty = if is_electric {
            Decimal::ZERO
        } else {
            request.price_eur * self.settings.import_duty_rate
        };

        let excise = self.excise(
            request.fuel_type,
            request.engine_capacity,
            request.year,
            current_year,
        );

        let vat = if is_electric && self.settings.electric_vat_exempt {
            Decimal::ZERO
        } else {
            (request.price_eur + duty + excise) * self.settings.vat_rate
        };

        let pension_fund = if is_electric && self.settings.electric_pension_exempt {
            Decimal::ZERO
        } else {
            self.pension_fee(request.price_eur, eur_rate)
        };

        let total_taxes = duty + excise + vat + pension_fund;
        let turnkey_price = request.price_eur + total_taxes;
        let potential_profit = market_price_eur - turnkey_price;

        let (brand_id, model_id) = self
            .catalog
            .resolve_references(request.brand_id, request.model_id)
            .await?;

        self.history
            .insert(NewCalculationRecord {
                device_id: device_id.to_string(),
                brand_id,
                model_id,
                year: request.year,
                fuel_type: request.fuel_type,
                engine_capacity: request.engine_capacity,
                price_eur: request.price_eur,
                total_taxes,
                turnkey_price,
                market_price_snapshot: market_price_eur,
                potential_profit,
            })
            .await?;

        Ok(CalculationOutcome {
            import_duty: duty,
            excise_tax: excise,
            vat,
            pension_fund,
            total_taxes,
            turnkey_price,
            market_price: market_price_eur,
            potential_profit,
            is_profitable: potential_profit > Decimal::ZERO,
            currency_rate_used: eur_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Brand, VehicleModel};
    use crate::errors::Error;
    use crate::history::CalculationRecord;
    use crate::rates::RatePair;
    use clearcost_market_data::CatalogModel;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct FixedRates {
        eur: Decimal,
        usd: Decimal,
        fail: bool,
        calls: AtomicU32,
    }

    impl FixedRates {
        fn new(eur: Decimal, usd: Decimal) -> Self {
            Self {
                eur,
                usd,
                fail: false,
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                eur: Decimal::ZERO,
                usd: Decimal::ZERO,
                fail: true,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateServiceTrait for FixedRates {
        async fn rate(&self, currency_code: &str) -> Result<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::RatesUnavailable {
                    currency: currency_code.to_string(),
                    reason: "scripted failure".to_string(),
                });
            }
            Ok(match currency_code {
                EUR => self.eur,
                _ => self.usd,
            })
        }

        async fn rate_pair(&self) -> Result<RatePair> {
            Ok(RatePair {
                eur: self.rate(EUR).await?,
                usd: self.rate(USD).await?,
                date: Utc::now(),
            })
        }

        async fn cross_rate(&self, source: &str, target: &str) -> Result<Decimal> {
            Ok(self.rate(source).await? / self.rate(target).await?)
        }
    }

    struct FixedMarket {
        price_usd: Decimal,
    }

    #[async_trait]
    impl MarketPriceServiceTrait for FixedMarket {
        async fn models(&self, _brand_id: i32) -> Result<Vec<CatalogModel>> {
            Ok(Vec::new())
        }

        async fn average_price(
            &self,
            _brand_id: i32,
            _model_id: i32,
            _year: i32,
            _fuel: Option<FuelType>,
        ) -> Result<Decimal> {
            Ok(self.price_usd)
        }
    }

    struct FixedCatalog {
        resolved: (Option<i32>, Option<i32>),
    }

    #[async_trait]
    impl CatalogServiceTrait for FixedCatalog {
        fn brands(&self) -> Result<Vec<Brand>> {
            Ok(Vec::new())
        }

        fn models_of_brand(&self, _brand_id: i32) -> Result<Vec<VehicleModel>> {
            Ok(Vec::new())
        }

        async fn resolve_references(
            &self,
            _brand_id: i32,
            _model_id: i32,
        ) -> Result<(Option<i32>, Option<i32>)> {
            Ok(self.resolved)
        }
    }

    #[derive(Default)]
    struct RecordingHistory {
        inserted: Mutex<Vec<NewCalculationRecord>>,
    }

    impl RecordingHistory {
        fn records(&self) -> Vec<NewCalculationRecord> {
            self.inserted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HistoryRepositoryTrait for RecordingHistory {
        fn records_for_device(&self, _device_id: &str) -> Result<Vec<CalculationRecord>> {
            Ok(Vec::new())
        }

        async fn insert(&self, record: NewCalculationRecord) -> Result<CalculationRecord> {
            self.inserted.lock().unwrap().push(record.clone());
            Ok(CalculationRecord {
                id: 1,
                device_id: record.device_id,
                brand_id: record.brand_id,
                model_id: record.model_id,
                year: record.year,
                fuel_type: record.fuel_type,
                engine_capacity: record.engine_capacity,
                price_eur: record.price_eur,
                total_taxes: record.total_taxes,
                turnkey_price: record.turnkey_price,
                market_price_snapshot: record.market_price_snapshot,
                potential_profit: record.potential_profit,
                created_at: Utc::now(),
            })
        }

        async fn delete(&self, _record_id: i32) -> Result<bool> {
            Ok(false)
        }

        async fn clear_device(&self, _device_id: &str) -> Result<usize> {
            Ok(0)
        }
    }

    struct Fixture {
        rates: Arc<FixedRates>,
        history: Arc<RecordingHistory>,
        service: CustomsService,
    }

    fn fixture(rates: FixedRates, market_usd: Decimal, settings: CustomsSettings) -> Fixture {
        let rates = Arc::new(rates);
        let history = Arc::new(RecordingHistory::default());
        let service = CustomsService::new(
            Arc::clone(&rates) as Arc<dyn RateServiceTrait>,
            Arc::new(FixedMarket {
                price_usd: market_usd,
            }),
            Arc::new(FixedCatalog {
                resolved: (Some(79), Some(2104)),
            }),
            Arc::clone(&history) as Arc<dyn HistoryRepositoryTrait>,
            Arc::new(settings),
        );
        Fixture {
            rates,
            history,
            service,
        }
    }

    fn petrol_request(year: i32) -> CalculationRequest {
        CalculationRequest {
            brand_id: 79,
            model_id: 2104,
            year,
            fuel_type: FuelType::Petrol,
            engine_capacity: 2000,
            price_eur: dec!(20000),
            device_id: None,
        }
    }

    #[tokio::test]
    async fn test_petrol_breakdown_five_years_old() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            dec!(30000),
            CustomsSettings::default(),
        );
        let request = petrol_request(Utc::now().year() - 5);

        let outcome = f.service.calculate(request, "device-1").await.unwrap();

        // duty: 20000 x 0.10
        assert_eq!(outcome.import_duty, dec!(2000));
        // excise: 50 EUR x 2.0 (litres) x 5 (age)
        assert_eq!(outcome.excise_tax, dec!(500));
        // VAT: (20000 + 2000 + 500) x 0.20
        assert_eq!(outcome.vat, dec!(4500));
        // pension: 20000 x 50 = 1,000,000 UAH -> top band 5% -> back to EUR
        assert_eq!(outcome.pension_fund, dec!(1000));

        assert_eq!(outcome.total_taxes, dec!(8000));
        assert_eq!(outcome.turnkey_price, dec!(28000));

        // market: 30000 USD x (40/50)
        assert_eq!(outcome.market_price, dec!(24000));
        assert_eq!(outcome.potential_profit, dec!(-4000));
        assert!(!outcome.is_profitable);
        assert_eq!(outcome.currency_rate_used, dec!(50));
    }

    #[tokio::test]
    async fn test_electric_pays_only_battery_excise_by_default() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );
        let request = CalculationRequest {
            fuel_type: FuelType::Electric,
            engine_capacity: 60,
            price_eur: dec!(30000),
            ..petrol_request(Utc::now().year() - 2)
        };

        let outcome = f.service.calculate(request, "device-1").await.unwrap();

        assert_eq!(outcome.import_duty, Decimal::ZERO);
        assert_eq!(outcome.excise_tax, dec!(60));
        assert_eq!(outcome.vat, Decimal::ZERO);
        assert_eq!(outcome.pension_fund, Decimal::ZERO);
        assert_eq!(outcome.turnkey_price, dec!(30060));
    }

    #[tokio::test]
    async fn test_electric_exemption_flags_can_be_disabled() {
        let settings = CustomsSettings {
            electric_vat_exempt: false,
            electric_pension_exempt: false,
            ..CustomsSettings::default()
        };
        let f = fixture(FixedRates::new(dec!(50), dec!(40)), Decimal::ZERO, settings);
        let request = CalculationRequest {
            fuel_type: FuelType::Electric,
            engine_capacity: 60,
            price_eur: dec!(30000),
            ..petrol_request(Utc::now().year() - 2)
        };

        let outcome = f.service.calculate(request, "device-1").await.unwrap();

        // Still no duty for electric, but VAT and pension apply.
        assert_eq!(outcome.import_duty, Decimal::ZERO);
        assert_eq!(outcome.vat, dec!(6012));
        // 30000 x 50 = 1.5M UAH -> top band 5% -> 75000 UAH -> 1500 EUR
        assert_eq!(outcome.pension_fund, dec!(1500));
    }

    #[tokio::test]
    async fn test_rate_failure_aborts_without_persisting() {
        let f = fixture(
            FixedRates::failing(),
            dec!(30000),
            CustomsSettings::default(),
        );
        let request = petrol_request(Utc::now().year() - 5);

        let err = f.service.calculate(request, "device-1").await.unwrap_err();
        assert!(matches!(err, Error::RatesUnavailable { .. }));
        assert!(f.history.records().is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejects_before_any_lookup() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            dec!(30000),
            CustomsSettings::default(),
        );
        let request = petrol_request(1990);

        let err = f.service.calculate(request, "device-1").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.rates.call_count(), 0);
        assert!(f.history.records().is_empty());
    }

    #[tokio::test]
    async fn test_missing_market_price_degrades_to_unprofitable() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );
        let request = petrol_request(Utc::now().year() - 5);

        let outcome = f.service.calculate(request, "device-1").await.unwrap();

        assert_eq!(outcome.market_price, Decimal::ZERO);
        assert_eq!(outcome.potential_profit, -outcome.turnkey_price);
        assert!(!outcome.is_profitable);
    }

    #[tokio::test]
    async fn test_breaking_even_is_not_profitable() {
        // usd == eur rate, so market USD maps 1:1 to EUR. Electric with the
        // default exemptions gives turnkey = price + battery excise.
        let f = fixture(
            FixedRates::new(dec!(50), dec!(50)),
            dec!(30060),
            CustomsSettings::default(),
        );
        let request = CalculationRequest {
            fuel_type: FuelType::Electric,
            engine_capacity: 60,
            price_eur: dec!(30000),
            ..petrol_request(Utc::now().year() - 2)
        };

        let outcome = f.service.calculate(request, "device-1").await.unwrap();

        assert_eq!(outcome.potential_profit, Decimal::ZERO);
        assert!(!outcome.is_profitable);
    }

    #[tokio::test]
    async fn test_record_carries_resolved_references_and_totals() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            dec!(30000),
            CustomsSettings::default(),
        );
        let request = petrol_request(Utc::now().year() - 5);

        let outcome = f.service.calculate(request, "device-42").await.unwrap();

        let records = f.history.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.device_id, "device-42");
        assert_eq!(record.brand_id, Some(79));
        assert_eq!(record.model_id, Some(2104));
        assert_eq!(record.fuel_type, FuelType::Petrol);
        assert_eq!(record.price_eur, dec!(20000));
        assert_eq!(record.total_taxes, outcome.total_taxes);
        assert_eq!(record.turnkey_price, outcome.turnkey_price);
        assert_eq!(record.market_price_snapshot, outcome.market_price);
        assert_eq!(record.potential_profit, outcome.potential_profit);
    }

    #[test]
    fn test_excise_thresholds_are_inclusive() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );
        let year = Utc::now().year() - 1;
        let current = Utc::now().year();

        // Petrol at exactly 3000 cm3 stays on the small rate.
        assert_eq!(
            f.service.excise(FuelType::Petrol, 3000, year, current),
            dec!(50) * dec!(3) * dec!(1)
        );
        assert_eq!(
            f.service.excise(FuelType::Petrol, 3001, year, current),
            dec!(100) * dec!(3.001) * dec!(1)
        );

        // Diesel at exactly 3500 cm3 stays on the small rate.
        assert_eq!(
            f.service.excise(FuelType::Diesel, 3500, year, current),
            dec!(75) * dec!(3.5) * dec!(1)
        );
        assert_eq!(
            f.service.excise(FuelType::Diesel, 3501, year, current),
            dec!(150) * dec!(3.501) * dec!(1)
        );
    }

    #[test]
    fn test_excise_age_is_clamped() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );
        let current = Utc::now().year();

        // Current-year vehicle still counts one year of age.
        assert_eq!(
            f.service.excise(FuelType::Petrol, 1000, current, current),
            dec!(50)
        );
        // A thirty-year-old vehicle caps at the statutory maximum.
        assert_eq!(
            f.service.excise(FuelType::Petrol, 1000, current - 30, current),
            dec!(50) * dec!(15)
        );
    }

    #[test]
    fn test_gas_vehicles_pay_no_excise() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );
        let current = Utc::now().year();

        assert_eq!(
            f.service.excise(FuelType::Gas, 2500, current - 5, current),
            Decimal::ZERO
        );
        assert_eq!(
            f.service.excise(FuelType::GasPetrol, 2500, current - 5, current),
            Decimal::ZERO
        );
        // Hybrid pays the flat rate regardless of displacement or age.
        assert_eq!(
            f.service.excise(FuelType::Hybrid, 2500, current - 5, current),
            dec!(100)
        );
    }

    #[test]
    fn test_pension_bands() {
        let f = fixture(
            FixedRates::new(dec!(50), dec!(40)),
            Decimal::ZERO,
            CustomsSettings::default(),
        );

        // 250,000 UAH: low band, 3%.
        assert_eq!(f.service.pension_fee(dec!(5000), dec!(50)), dec!(150));
        // 600,000 UAH: medium band, 4%.
        assert_eq!(f.service.pension_fee(dec!(12000), dec!(50)), dec!(480));
        // 1,500,000 UAH: high band, 5%.
        assert_eq!(f.service.pension_fee(dec!(30000), dec!(50)), dec!(1500));
        // Exactly on tier 1 stays in the low band.
        assert_eq!(
            f.service.pension_fee(dec!(9992.4), dec!(50)),
            dec!(9992.4) * dec!(50) * dec!(0.03) / dec!(50)
        );
    }
}
