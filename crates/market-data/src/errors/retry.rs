/// Classification for retry policy.
///
/// Used to determine how the resilience policy should respond to errors
/// from an upstream call.
///
/// # Behavior Summary
///
/// | Class | Retried With Backoff? | Recorded As Breaker Failure? |
/// |-------|----------------------|------------------------------|
/// | `Retry` | Yes (until attempts exhausted) | Yes (once, when exhausted) |
/// | `Fatal` | No | No |
/// | `CircuitOpen` | No | No (already recorded) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure - worth retrying with exponential backoff.
    ///
    /// Covers network errors, timeouts, HTTP 5xx, and rate limiting (429).
    /// If every attempt fails, the failure is recorded in the circuit
    /// breaker, which may open the circuit for the target after enough
    /// consecutive exhausted sequences.
    Retry,

    /// Terminal failure - retrying won't help.
    ///
    /// Covers client errors other than 429 and malformed payloads. The
    /// request is fundamentally broken for this target, so the error is
    /// returned immediately and the breaker state is left untouched.
    Fatal,

    /// The circuit breaker is open for this target.
    /// No attempt was made; fail fast until the circuit allows a trial.
    CircuitOpen,
}
