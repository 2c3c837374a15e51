//! Error types for behaviour summarization

use thiserror::Error;

/// Errors that can occur while normalizing or summarizing an event log
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("No reference event {0:?} in event log")]
    MissingReferenceEvent(String),

    #[error("Malformed timestamp at row {row}: {value:?}")]
    MalformedTimestamp { row: usize, value: String },

    #[error("Unbalanced intervals for {behaviour:?}: {starts} START vs {stops} STOP")]
    MismatchedIntervalCount {
        behaviour: String,
        starts: usize,
        stops: usize,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to parse export: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
