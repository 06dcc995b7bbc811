//! Unified error hierarchy for readyrs
//!
//! Partial or missing telemetry is never an error here: the scoring engine
//! treats absence as an expected input shape. These types cover structurally
//! invalid input, storage failures, and provider failures.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::database::DatabaseError;

/// Top-level error type for all readyrs operations
#[derive(Debug, Error)]
pub enum ReadyRsError {
    /// Daily metrics store errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Telemetry provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Scoring engine errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Invalid input structure (e.g. inverted date range)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report or export serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while fetching one telemetry category from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider source could not be opened at all
    #[error("Provider source unavailable: {path}")]
    Unavailable { path: PathBuf },

    /// A category payload could not be read
    #[error("Failed to read {category} for {date}: {reason}")]
    ReadFailed {
        category: String,
        date: String,
        reason: String,
    },

    /// A category payload was present but malformed
    #[error("Malformed {category} payload for {date}: {reason}")]
    Malformed {
        category: String,
        date: String,
        reason: String,
    },
}

/// Scoring engine errors. Only structurally invalid configuration ends up
/// here; absent factors are handled inside the engine.
#[derive(Debug, Error)]
pub enum CalculationError {
    /// A factor weight is negative or not finite
    #[error("Invalid weight for {factor}: {value}")]
    InvalidWeight { factor: String, value: f64 },

    /// Every factor weight is zero
    #[error("Factor weights sum to zero")]
    ZeroWeights,

    /// Any other out-of-range parameter
    #[error("Invalid parameter {parameter}={value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for readyrs operations
pub type Result<T> = std::result::Result<T, ReadyRsError>;

impl ReadyRsError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReadyRsError::Provider(ProviderError::ReadFailed { .. }) | ReadyRsError::Io(_)
        ) || matches!(self, ReadyRsError::Database(DatabaseError::SqliteError(_)))
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReadyRsError::Provider(_) => ErrorSeverity::Warning,
            ReadyRsError::Validation(_) => ErrorSeverity::Warning,
            ReadyRsError::Database(_) => ErrorSeverity::Error,
            ReadyRsError::Calculation(_) => ErrorSeverity::Error,
            ReadyRsError::Configuration(_) => ErrorSeverity::Error,
            ReadyRsError::Io(_) => ErrorSeverity::Error,
            ReadyRsError::Serialization(_) => ErrorSeverity::Critical,
        }
    }

    /// Suggestion shown to the user when running the command again may help
    pub fn retry_hint(&self) -> Option<&'static str> {
        self.is_retryable()
            .then_some("This looks temporary; running the command again may succeed.")
    }

    /// Record the error in the log at the level its severity maps to
    pub fn log(&self) {
        let retryable = self.is_retryable();
        if self.severity().to_tracing_level() == tracing::Level::ERROR {
            tracing::error!(error = %self, retryable, "Command failed");
        } else {
            tracing::warn!(error = %self, retryable, "Command failed");
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ReadyRsError::Provider(ProviderError::Unavailable { path }) => {
                format!("Could not open provider export at {}", path.display())
            }
            ReadyRsError::Database(DatabaseError::SqliteError(_)) => {
                "Unable to access the metrics database. Please check the database path in your configuration."
                    .to_string()
            }
            ReadyRsError::Calculation(CalculationError::ZeroWeights) => {
                "Readiness weights are all zero. Set at least one factor weight above zero.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
