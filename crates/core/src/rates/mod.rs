//! Exchange rates module - daily NBU rates with caching, fallback, and warmup.

mod rates_model;
mod rates_service;
mod rates_traits;
mod warmup;

// Re-export the public interface
pub use rates_model::{ExchangeRate, NewExchangeRate, RatePair};
pub use rates_service::RateService;
pub use rates_traits::{RateRepositoryTrait, RateServiceTrait};
pub use warmup::{RateWarmup, WarmupHandle};
