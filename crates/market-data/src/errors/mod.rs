//! Error types and retry classification for upstream calls.
//!
//! This module provides:
//! - [`UpstreamError`]: The main error enum for all upstream operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to an upstream service.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// resilience policy handles the error.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The target rate limited the request (HTTP 429).
    /// Worth retrying after a backoff.
    #[error("Rate limited: {target}")]
    RateLimited {
        /// The upstream target that rate limited the request
        target: String,
    },

    /// The request to the target timed out (per-attempt client timeout or
    /// the policy's outer deadline).
    #[error("Timeout: {target}")]
    Timeout {
        /// The upstream target that timed out
        target: String,
    },

    /// The target answered with a non-success HTTP status.
    /// Server errors (5xx) are transient; other client errors are terminal.
    #[error("Upstream status {code}: {target}")]
    Status {
        /// The upstream target that returned the status
        target: String,
        /// The HTTP status code
        code: u16,
    },

    /// The target answered 200 but the body could not be interpreted.
    /// Terminal - the same request would produce the same payload.
    #[error("Invalid payload from {target}: {message}")]
    InvalidPayload {
        /// The upstream target that returned the payload
        target: String,
        /// Description of what was wrong with it
        message: String,
    },

    /// The circuit breaker is open for this target.
    /// The call failed fast without touching the network.
    #[error("Circuit open: {target}")]
    CircuitOpen {
        /// The target with an open circuit
        target: String,
    },

    /// A network error occurred while communicating with the target.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl UpstreamError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Retry`]: transient, retry with exponential backoff
    /// - [`RetryClass::Fatal`]: terminal, return immediately
    /// - [`RetryClass::CircuitOpen`]: no attempt was made, fail fast
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient errors - retry with backoff
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_) => RetryClass::Retry,

            // 5xx and 429 are transient even when surfaced as raw statuses
            Self::Status { code, .. } if *code == 429 || (500..600).contains(code) => {
                RetryClass::Retry
            }

            // Remaining statuses (other 4xx) and unusable payloads are terminal
            Self::Status { .. } | Self::InvalidPayload { .. } => RetryClass::Fatal,

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,
        }
    }

    /// True when the error was rate limiting, regardless of how the target
    /// reported it. Callers use this to pick a longer cooldown for cached
    /// degraded values.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Status { code: 429, .. }
        )
    }
}
