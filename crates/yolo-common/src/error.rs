//! Error types for weight loading

use crate::config::ConfigError;
use crate::format::ParameterKind;
use thiserror::Error;

/// Errors produced while fetching, decoding, or reshaping stored weights.
#[derive(Debug, Error)]
pub enum WeightsError {
    /// No resource exists at the resolved address, or its version tag does not match.
    #[error("Weights not found: {address}")]
    NotFound { address: String },

    /// The byte stream could not be parsed as a float sequence.
    #[error("Failed to decode weights at {address}: {reason}")]
    Decode { address: String, reason: String },

    /// The flat length does not equal the product of the declared dimensions.
    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A parameter kind was passed to an operation that cannot produce it.
    #[error("Unsupported parameter kind {kind} for {operation}")]
    UnsupportedKind { kind: ParameterKind, operation: &'static str },

    #[error("Invalid resource name: {0:?}")]
    InvalidName(String),

    #[error("Numeric backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WeightsError {
    pub fn not_found(address: impl Into<String>) -> Self {
        Self::NotFound { address: address.into() }
    }

    pub fn decode(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode { address: address.into(), reason: reason.into() }
    }

    /// Whether this error means the named resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<candle_core::Error> for WeightsError {
    fn from(err: candle_core::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result type for weight operations
pub type Result<T> = std::result::Result<T, WeightsError>;
