//! Error types for Splunk index reconciliation.
//!
//! This module provides the error hierarchy for every stage of a run:
//! parameter loading and validation, the connection to the Splunk
//! management API, rejected index operations, and reconciliation steps.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for index reconciliation.
#[derive(Debug, Error)]
pub enum SplunkIndexError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The Splunk management API could not be reached or refused our credentials.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Splunk rejected an operation on the index.
    #[error("Resource state error: {0}")]
    ResourceState(#[from] ResourceStateError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Configuration-related errors.
///
/// All of these are raised before any remote I/O happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The parameter file was not found.
    #[error("Parameter file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The parameter file could not be parsed.
    #[error("Failed to parse parameters: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// A required parameter was not supplied.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// The connection scheme is neither `http` nor `https`.
    #[error("Unsupported scheme '{scheme}', expected http or https")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// The Splunk version string could not be parsed.
    #[error("Invalid Splunk version '{version}'")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
    },

    /// Validation failed.
    #[error("Parameter validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Errors reaching or authenticating against the Splunk management API.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Authentication failed.
    #[error("Splunk authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// Network error.
    #[error("Network error communicating with Splunk: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Invalid response from API.
    #[error("Invalid response from Splunk API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },
}

/// Errors raised when Splunk refuses an index operation.
#[derive(Debug, Error)]
pub enum ResourceStateError {
    /// The API rejected the request.
    #[error("Splunk rejected the request: {status} - {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// The index was expected to exist but Splunk reported it missing.
    #[error("Index not found: {index}")]
    NotFound {
        /// Name of the missing index.
        index: String,
    },

    /// Cleaning did not drain the index in time.
    #[error("Cleaning index '{index}' took longer than {timeout_secs} seconds")]
    CleanTimedOut {
        /// Name of the index being cleaned.
        index: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
}

/// Reconciliation errors.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A remote call failed; no later step was attempted.
    #[error("{step} failed for index '{index}': {source}")]
    StepFailed {
        /// Name of the index being reconciled.
        index: String,
        /// The step that failed.
        step: ReconcileStep,
        /// The underlying failure.
        #[source]
        source: Box<SplunkIndexError>,
    },
}

/// The reconciliation step during which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    /// Checking whether the index exists.
    ExistenceCheck,
    /// Reading the current index attributes.
    FetchAttributes,
    /// Creating the index.
    Create,
    /// Updating mutable attributes.
    Update,
    /// Enabling the index.
    Enable,
    /// Disabling the index.
    Disable,
    /// Purging index data.
    Clean,
    /// Deleting the index.
    Delete,
}

/// Result type alias for index reconciliation.
pub type Result<T> = std::result::Result<T, SplunkIndexError>;

impl SplunkIndexError {
    /// Returns the underlying error, looking through reconciliation step wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Reconcile(ReconcileError::StepFailed { source, .. }) => source.root_cause(),
            other => other,
        }
    }

    /// Returns the reconciliation step that failed, if the error came from one.
    #[must_use]
    pub const fn failed_step(&self) -> Option<ReconcileStep> {
        match self {
            Self::Reconcile(ReconcileError::StepFailed { step, .. }) => Some(*step),
            _ => None,
        }
    }

    /// Returns true if the error was raised before any remote I/O.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self.root_cause(), Self::Config(_))
    }
}

impl ConfigError {
    /// Creates a missing parameter error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }
}

impl ConnectionError {
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

impl ResourceStateError {
    /// Creates a rejected request error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl ReconcileError {
    /// Wraps a failure raised during `step`.
    #[must_use]
    pub fn step_failed(index: impl Into<String>, step: ReconcileStep, source: SplunkIndexError) -> Self {
        Self::StepFailed {
            index: index.into(),
            step,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExistenceCheck => "existence check",
            Self::FetchAttributes => "attribute fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Clean => "clean",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}
