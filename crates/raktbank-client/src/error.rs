//! Error Taxonomy
//!
//! One error type per failure class. Only `ValidationError` and the
//! prediction outcome ever reach the user; persistence failures are
//! logged and swallowed by the sync client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::records::BloodGroup;

/// A required field was missing or malformed. Raised before any mutation
/// or network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field left empty
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("unknown blood group '{0}'")]
    UnknownBloodGroup(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("age must be a number, got '{0}'")]
    InvalidAge(String),

    /// Two inventory items for the same group in one snapshot
    #[error("blood group {0} appears more than once in the inventory snapshot")]
    DuplicateGroup(BloodGroup),
}

/// A background save of a donor or appointment failed.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered {status}")]
    Status { endpoint: String, status: StatusCode },
}

/// A prediction cycle could not produce a result.
#[derive(Debug, Error)]
pub enum PredictionFailure {
    #[error("prediction request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction endpoint answered {0}")]
    Status(StatusCode),

    #[error("malformed prediction response: {0}")]
    Malformed(String),

    /// The collaborator answered with its own `{error}` body
    #[error("prediction rejected: {0}")]
    Rejected(String),
}

/// Inventory refresh failed; the current snapshot is kept.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("inventory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("inventory endpoint answered {0}")]
    Status(StatusCode),

    #[error("undecodable inventory body: {0}")]
    Decode(String),

    #[error("invalid inventory snapshot: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
