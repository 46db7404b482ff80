//! ClearCost Market Data Crate
//!
//! Upstream connectivity for the ClearCost calculator: official currency
//! rates from the NBU statdirectory and vehicle catalog/market prices from
//! the AutoRia developers API, plus the machinery every outbound call
//! shares.
//!
//! # Overview
//!
//! - Typed clients behind small traits ([`RateProvider`],
//!   [`VehicleMarketProvider`]) so the domain layer never sees HTTP
//! - A composed [`ResiliencePolicy`]: overall timeout, per-target circuit
//!   breaking, retry with exponential backoff on transient failures
//! - A [`TtlCache`] memory tier with per-entry deadlines, shared by the
//!   rate and market-price lookups
//! - [`UpstreamError`] with [`RetryClass`] classification driving the
//!   policy's decisions
//!
//! The crate is deliberately free of persistence and tax-domain concerns;
//! those live in `clearcost-core`.

pub mod cache;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resilience;

// Re-export the cache
pub use cache::TtlCache;

// Re-export error types
pub use errors::{RetryClass, UpstreamError};

// Re-export wire-facing models
pub use models::{AveragePrice, AveragePriceQuery, CatalogModel, RateQuote};

// Re-export provider traits and implementations
pub use provider::autoria::AutoRiaProvider;
pub use provider::nbu::NbuProvider;
pub use provider::{RateProvider, VehicleMarketProvider};

// Re-export resilience types
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, ResilienceConfig, ResiliencePolicy,
};
