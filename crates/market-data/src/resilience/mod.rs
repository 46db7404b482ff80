//! Resilience policies for outbound upstream calls.
//!
//! This module provides:
//! - Circuit breaking per upstream target
//! - Retry with exponential backoff on transient failures
//! - An overall timeout bounding every call sequence
//!
//! composed by [`ResiliencePolicy`] exactly as timeout -> breaker -> retry.

mod circuit_breaker;
mod policy;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use policy::{ResilienceConfig, ResiliencePolicy};
