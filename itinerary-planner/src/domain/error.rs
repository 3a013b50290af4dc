//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the domain layer. They are distinct from planning and I/O errors.

use super::TripKey;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Stop index is out of bounds for the trip
    #[error("invalid stop index on {0}: out of bounds")]
    InvalidStopIndex(TripKey),

    /// Invalid candidate construction (e.g., alight before board)
    #[error("invalid trip candidate: {0}")]
    InvalidCandidate(&'static str),

    /// A trip instance whose stop times run backwards
    #[error("stop times on {0} are not in chronological order")]
    UnorderedStopTimes(TripKey),

    /// A trip instance with fewer than two stops
    #[error("{0} must call at two or more stops")]
    TooFewStops(TripKey),
}
