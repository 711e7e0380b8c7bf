//! Validation errors for domain value objects.

use thiserror::Error;

/// Returned by value-object constructors when the raw input is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} exceeds the maximum length of {max}")]
    TooLong { field: &'static str, max: usize },
}
