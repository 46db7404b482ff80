//! Customs module - the calculation request/outcome model and the engine.

mod customs_model;
mod customs_service;
mod customs_traits;

// Re-export the public interface
pub use customs_model::{
    CalculationOutcome, CalculationRequest, FuelType, MAX_ELECTRIC_CAPACITY_KWH,
    MAX_ENGINE_CAPACITY_CC, MIN_VEHICLE_YEAR,
};
pub use customs_service::CustomsService;
pub use customs_traits::CustomsServiceTrait;
