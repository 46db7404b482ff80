//! ClearCost Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for ClearCost: exchange
//! rate caching, market price lookups, the customs calculation engine,
//! the brand/model dictionary, and per-device calculation history. It is
//! database-agnostic and defines repository traits that are implemented
//! by the `storage-sqlite` crate.

pub mod catalog;
pub mod constants;
pub mod customs;
pub mod errors;
pub mod history;
pub mod market_prices;
pub mod rates;
pub mod settings;

// Re-export the types the calculation surface is built from
pub use customs::{CalculationOutcome, CalculationRequest, FuelType};
pub use settings::CustomsSettings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
