//! Error types for the core value objects.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or reading core value objects.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("candidate {candidate_id} has no attribute {attribute}")]
    MissingAttribute {
        candidate_id: String,
        attribute: String,
    },

    #[error("attribute {attribute} of candidate {candidate_id} is not numeric")]
    NotNumeric {
        candidate_id: String,
        attribute: String,
    },

    #[error("duplicate demand: {0}")]
    DuplicateDemand(String),
}
