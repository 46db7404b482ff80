//! Upstream client abstractions and implementations.
//!
//! This module contains:
//! - The `RateProvider` and `VehicleMarketProvider` traits the domain
//!   layer programs against
//! - Concrete clients for the NBU statdirectory and AutoRia developers APIs
//!
//! The clients only translate HTTP into typed results and errors; caching,
//! resilience, and fallback decisions live with the callers.

mod traits;

pub mod autoria;
pub mod nbu;

// Re-exports
pub use traits::{RateProvider, VehicleMarketProvider};
