//! Composed resilience policy for outbound upstream calls.
//!
//! Three independent layers, composed outermost to innermost as
//! timeout -> circuit breaker -> retry:
//!
//! - the overall timeout bounds user-visible latency even when the retry
//!   sequence inside is still sleeping between attempts;
//! - the circuit breaker admits or rejects the whole sequence and sees one
//!   verdict per [`execute`](ResiliencePolicy::execute) call, so "consecutive
//!   failures" means consecutive exhausted sequences, not raw attempts;
//! - the retry layer re-invokes the operation on transient errors with
//!   exponential backoff.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{sleep, timeout};

use crate::errors::{RetryClass, UpstreamError};
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

/// Default bound on the whole call sequence, retries and backoff included.
const DEFAULT_OVERALL_TIMEOUT: Duration = Duration::from_secs(45);

/// Default number of retries after the initial attempt.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff unit; the n-th retry sleeps `unit * 2^n` (2s, 4s, 8s).
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Resilience policy configuration.
#[derive(Clone, Debug)]
pub struct ResilienceConfig {
    /// Ceiling on one `execute` call, covering every attempt and backoff.
    pub overall_timeout: Duration,
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff unit; retry n sleeps `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Circuit breaker thresholds.
    pub breaker: CircuitBreakerConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            overall_timeout: DEFAULT_OVERALL_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Reusable execution wrapper around calls to flaky upstreams.
///
/// One instance is shared process-wide; breaker state is keyed by the
/// `target` string passed to [`execute`](Self::execute), so concurrent
/// callers hitting the same upstream share a circuit.
pub struct ResiliencePolicy {
    config: ResilienceConfig,
    breaker: CircuitBreaker,
}

impl ResiliencePolicy {
    /// Create a policy with default settings.
    pub fn new() -> Self {
        Self::with_config(ResilienceConfig::default())
    }

    /// Create a policy with custom settings.
    pub fn with_config(config: ResilienceConfig) -> Self {
        let breaker = CircuitBreaker::with_config(config.breaker.clone());
        Self { config, breaker }
    }

    /// Run `op` under timeout, circuit breaking, and retry.
    ///
    /// `op` must produce a fresh future per invocation; retries re-invoke it.
    /// Timeouts of the overall ceiling are reported as
    /// [`UpstreamError::Timeout`] and do not touch breaker state (the
    /// sequence was abandoned, not observed to fail).
    pub async fn execute<T, F, Fut>(&self, target: &str, op: F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        match timeout(self.config.overall_timeout, self.run_guarded(target, op)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpstreamError::Timeout {
                target: target.to_string(),
            }),
        }
    }

    /// Current breaker state for a target. Exposed for diagnostics.
    pub fn circuit_state(&self, target: &str) -> CircuitState {
        self.breaker.state(target)
    }

    /// Reset the breaker for a target.
    pub fn reset_circuit(&self, target: &str) {
        self.breaker.reset(target)
    }

    async fn run_guarded<T, F, Fut>(&self, target: &str, op: F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        if !self.breaker.is_allowed(target) {
            return Err(UpstreamError::CircuitOpen {
                target: target.to_string(),
            });
        }

        match self.run_with_retries(target, op).await {
            Ok(value) => {
                self.breaker.record_success(target);
                Ok(value)
            }
            Err(err) => {
                match err.retry_class() {
                    RetryClass::Retry => self.breaker.record_failure(target),
                    // A terminal error says nothing about upstream health;
                    // release a pending trial so the next caller may probe.
                    RetryClass::Fatal => self.breaker.clear_trial(target),
                    RetryClass::CircuitOpen => {}
                }
                Err(err)
            }
        }
    }

    async fn run_with_retries<T, F, Fut>(&self, target: &str, op: F) -> Result<T, UpstreamError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if err.retry_class() != RetryClass::Retry || attempt >= self.config.max_retries
                    {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.config.backoff_base * 2u32.saturating_pow(attempt);
                    debug!(
                        "Transient failure from '{}' ({}), retry {}/{} in {:?}",
                        target, err, attempt, self.config.max_retries, delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self::new()
    }
}
