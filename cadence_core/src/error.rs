//! Error types for the cadence_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cadence_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Update or delete targeted an id that is not in the record set
    #[error("No period with id {0}")]
    PeriodNotFound(Uuid),

    /// A new period was started while another one is still open
    #[error("Period {0} is still active; end it before starting a new one")]
    ActivePeriod(Uuid),

    /// An end date was logged with no open period to attach it to
    #[error("No active period to end")]
    NoActivePeriod,

    /// Rejected caller input (unknown flow level, bad CSV field, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
