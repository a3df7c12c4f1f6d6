//! Error types for schwarzschild.
//!
//! Every fallible operation returns `Result<T, OrbitError>` instead of
//! panicking. Leaving the physical domain during integration is *not* an
//! error: it is reported as a [`Termination`](crate::orbit::trajectory::Termination)
//! on an otherwise valid run.

use thiserror::Error;

/// Result type alias for schwarzschild operations.
pub type OrbitResult<T> = Result<T, OrbitError>;

/// Unified error type for all schwarzschild operations.
#[derive(Debug, Error)]
pub enum OrbitError {
    // ===== Input Domain =====
    /// A parameter lies outside the domain where the model is defined.
    #[error("Out of domain: {parameter} = {value} ({reason})")]
    OutOfDomain {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Rejected value.
        value: f64,
        /// Which constraint was violated.
        reason: String,
    },

    /// Numerical instability detected (NaN or Inf).
    #[error("Non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl OrbitError {
    /// Create an out-of-domain error for a named parameter.
    #[must_use]
    pub fn out_of_domain(parameter: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::OutOfDomain {
            parameter,
            value,
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }
}

impl From<serde_json::Error> for OrbitError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
