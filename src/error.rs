//! Error types for FitTrack Trends

use thiserror::Error;

/// Errors that can occur while resolving ranges or building metrics
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid range token: {0}")]
    InvalidRange(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse snapshot: {0}")]
    ParseError(String),
}
