//! Error types for the application

use thiserror::Error;

/// Result type alias using our DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Main error type for dashboard operations
///
/// Only validation and generation failures are meant to reach an end user.
/// Persistence faults are recovered inside the cache and the tracker.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Invalid or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Strategy not in the configured list
    #[error("Invalid strategy: {strategy}. Must be one of {allowed:?}")]
    InvalidStrategy {
        strategy: String,
        allowed: Vec<String>,
    },

    /// Risk level outside low/medium/high
    #[error("Invalid risk level: {0}. Must be 'low', 'medium', or 'high'")]
    InvalidRiskLevel(String),

    /// Unknown recommendation status
    #[error("Invalid status: {0}. Must be 'open', 'closed', or 'expired'")]
    InvalidStatus(String),

    /// Unknown timeframe
    #[error("Invalid timeframe: {0}. Must be 'day', 'week', 'month', or 'all'")]
    InvalidTimeframe(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The upstream recommendation generator failed
    #[error("Failed to generate recommendations: {0}")]
    GenerationFailed(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// Returns true if the error was caused by caller input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashboardError::Validation(_)
                | DashboardError::InvalidStrategy { .. }
                | DashboardError::InvalidRiskLevel(_)
                | DashboardError::InvalidStatus(_)
                | DashboardError::InvalidTimeframe(_)
        )
    }
}
