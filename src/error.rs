//! Error types for the graylog-state reconciler.
//!
//! This module provides the error hierarchy for every stage of a
//! reconciliation pass: configuration, the Graylog API, value comparison,
//! and plan execution.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for graylog-state.
#[derive(Debug, Error)]
pub enum GraylogStateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graylog API errors.
    #[error("Graylog API error: {0}")]
    Api(#[from] ApiError),

    /// Comparator contract errors.
    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Graylog API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Session authentication failed.
    #[error("Graylog authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("Graylog API request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Input not found.
    #[error("Input not found: {input_id}")]
    InputNotFound {
        /// ID of the missing input.
        input_id: String,
    },

    /// Network error.
    #[error("Network error communicating with Graylog: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid response from Graylog API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Comparator contract errors.
///
/// These signal a programming or integration error, never an ordinary data
/// mismatch. Mismatches are folded into the boolean diff result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// The observed attribute payload was not a key/value mapping.
    #[error("attributes must be a JSON object, found {found}")]
    ContractViolation {
        /// JSON kind that was found instead.
        found: &'static str,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A remote operation failed and the pass was stopped.
    #[error("Failed to {operation} input '{target}' after {applied} applied operation(s): {source}")]
    OperationFailed {
        /// Operation kind (create, update, delete).
        operation: &'static str,
        /// Input title or ID the operation targeted.
        target: String,
        /// Number of operations applied before the failure.
        applied: usize,
        /// Underlying failure.
        #[source]
        source: Box<GraylogStateError>,
    },
}

/// Result type alias for graylog-state operations.
pub type Result<T> = std::result::Result<T, GraylogStateError>;

impl GraylogStateError {
    /// Returns true if this error came from the remote side.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ApiError {
    /// Creates an API request error.
    #[must_use]
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
