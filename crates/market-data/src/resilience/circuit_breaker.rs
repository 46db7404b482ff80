//! Per-target circuit breaker for fault tolerance.
//!
//! Prevents hammering an upstream that is already failing. The circuit has
//! three states:
//!
//! - **Closed**: Normal operation, calls are allowed through.
//! - **Open**: Target is failing, calls are blocked.
//! - **HalfOpen**: One trial call is allowed to test recovery.
//!
//! The circuit breaker is in-memory and resets on application restart.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

/// Default number of consecutive failures before opening the circuit.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time the circuit stays open before allowing a trial call.
const DEFAULT_BREAK_DURATION: Duration = Duration::from_secs(30);

/// Number of successful trials needed to close the circuit from HalfOpen.
const HALF_OPEN_SUCCESS_THRESHOLD: u32 = 1;

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    /// Normal operation - calls are allowed.
    Closed,
    /// Target is failing - calls are blocked.
    Open,
    /// Testing recovery - a single trial call is allowed.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Internal circuit state for a single target.
#[derive(Debug)]
struct Circuit {
    /// Current circuit state.
    state: CircuitState,
    /// Number of consecutive failures.
    failure_count: u32,
    /// Number of consecutive successes in HalfOpen state.
    half_open_successes: u32,
    /// Whether a HalfOpen trial call is currently in flight.
    trial_in_flight: bool,
    /// Time of the last failure (for the break duration).
    last_failure: Option<Instant>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            half_open_successes: 0,
            trial_in_flight: false,
            last_failure: None,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before testing recovery.
    pub break_duration: Duration,
    /// Number of trial successes needed to close from HalfOpen.
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            break_duration: DEFAULT_BREAK_DURATION,
            half_open_success_threshold: HALF_OPEN_SUCCESS_THRESHOLD,
        }
    }
}

/// Per-target circuit breaker.
///
/// Thread-safe; one instance is shared by every caller hitting the same set
/// of upstream targets, so one request's failures open the circuit for all.
pub struct CircuitBreaker {
    /// Per-target circuit states.
    circuits: Mutex<HashMap<String, Circuit>>,
    /// Configuration.
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with default settings.
    pub fn new() -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config: CircuitBreakerConfig::default(),
        }
    }

    /// Create a circuit breaker with custom configuration.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits mutex, recovering from poison if necessary.
    ///
    /// Recovering is safe here: the worst case is slightly stale circuit
    /// state, which the next success/failure corrects.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Check if a call is allowed for a target.
    ///
    /// Returns true when the circuit is Closed, or HalfOpen with no trial
    /// already in flight. Returns false while the circuit is Open or a
    /// HalfOpen trial is pending.
    ///
    /// Also handles the Open -> HalfOpen transition once the break
    /// duration has elapsed; the admitted call is the trial.
    pub fn is_allowed(&self, target: &str) -> bool {
        let mut circuits = self.lock_circuits();

        let circuit = circuits.entry(target.to_string()).or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if circuit.trial_in_flight {
                    false
                } else {
                    circuit.trial_in_flight = true;
                    true
                }
            }
            CircuitState::Open => {
                if let Some(last_failure) = circuit.last_failure {
                    if last_failure.elapsed() >= self.config.break_duration {
                        info!(
                            "Circuit breaker: transitioning '{}' from Open to HalfOpen",
                            target
                        );
                        circuit.state = CircuitState::HalfOpen;
                        circuit.half_open_successes = 0;
                        circuit.trial_in_flight = true;
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Record a successful call for a target.
    ///
    /// In Closed state: resets the failure count.
    /// In HalfOpen state: completes the trial and may close the circuit.
    pub fn record_success(&self, target: &str) {
        let mut circuits = self.lock_circuits();

        let circuit = circuits.entry(target.to_string()).or_insert_with(Circuit::new);

        match circuit.state {
            CircuitState::Closed => {
                circuit.failure_count = 0;
                debug!(
                    "Circuit breaker: success for '{}', failure count reset",
                    target
                );
            }
            CircuitState::HalfOpen => {
                circuit.trial_in_flight = false;
                circuit.half_open_successes += 1;
                debug!(
                    "Circuit breaker: trial success for '{}' ({}/{})",
                    target, circuit.half_open_successes, self.config.half_open_success_threshold
                );

                if circuit.half_open_successes >= self.config.half_open_success_threshold {
                    info!(
                        "Circuit breaker: closing circuit for '{}' after recovery",
                        target
                    );
                    circuit.state = CircuitState::Closed;
                    circuit.failure_count = 0;
                    circuit.half_open_successes = 0;
                    circuit.last_failure = None;
                }
            }
            CircuitState::Open => {
                // is_allowed should have transitioned to HalfOpen first
                debug!(
                    "Circuit breaker: unexpected success for '{}' in Open state",
                    target
                );
            }
        }
    }

    /// Record a failed call for a target.
    ///
    /// Increments the consecutive-failure count and may open the circuit.
    /// In HalfOpen state, a failed trial immediately reopens the circuit.
    pub fn record_failure(&self, target: &str) {
        let mut circuits = self.lock_circuits();

        let circuit = circuits.entry(target.to_string()).or_insert_with(Circuit::new);

        circuit.failure_count += 1;
        circuit.last_failure = Some(Instant::now());

        match circuit.state {
            CircuitState::Closed => {
                if circuit.failure_count >= self.config.failure_threshold {
                    info!(
                        "Circuit breaker: opening circuit for '{}' after {} consecutive failures",
                        target, circuit.failure_count
                    );
                    circuit.state = CircuitState::Open;
                } else {
                    debug!(
                        "Circuit breaker: failure for '{}' ({}/{})",
                        target, circuit.failure_count, self.config.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                info!(
                    "Circuit breaker: reopening circuit for '{}' after failed trial",
                    target
                );
                circuit.state = CircuitState::Open;
                circuit.half_open_successes = 0;
                circuit.trial_in_flight = false;
            }
            CircuitState::Open => {
                debug!(
                    "Circuit breaker: additional failure for '{}' (already open)",
                    target
                );
            }
        }
    }

    /// Get the current state for a target.
    pub fn state(&self, target: &str) -> CircuitState {
        let circuits = self.lock_circuits();

        circuits
            .get(target)
            .map(|c| c.state)
            .unwrap_or(CircuitState::Closed)
    }

    /// Get the consecutive-failure count for a target.
    pub fn failure_count(&self, target: &str) -> u32 {
        let circuits = self.lock_circuits();

        circuits.get(target).map(|c| c.failure_count).unwrap_or(0)
    }

    /// Release the HalfOpen trial slot without deciding the circuit.
    ///
    /// Used when a trial ends with an error the breaker does not track
    /// (a terminal client error says nothing about recovery). The next
    /// caller gets to probe instead.
    pub fn clear_trial(&self, target: &str) {
        let mut circuits = self.lock_circuits();

        if let Some(circuit) = circuits.get_mut(target) {
            if circuit.state == CircuitState::HalfOpen {
                circuit.trial_in_flight = false;
            }
        }
    }

    /// Reset the circuit for a target to Closed state.
    pub fn reset(&self, target: &str) {
        let mut circuits = self.lock_circuits();

        if let Some(circuit) = circuits.get_mut(target) {
            info!("Circuit breaker: manually resetting circuit for '{}'", target);
            circuit.state = CircuitState::Closed;
            circuit.failure_count = 0;
            circuit.half_open_successes = 0;
            circuit.trial_in_flight = false;
            circuit.last_failure = None;
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}
