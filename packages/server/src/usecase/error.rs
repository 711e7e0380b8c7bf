//! Error taxonomy for rejected client events.
//!
//! Every rejection travels back to the originating connection as an
//! `error` server event whose `kind` field carries the machine-readable
//! variant name, so clients can tell "re-authenticate" apart from
//! "transient failure, retry".

use thiserror::Error;

use crate::domain::{AuthError, StoreError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// No identity attached to the connection yet.
    #[error("authenticate before sending this event")]
    Unauthenticated,

    /// Identity present but lacking rights over the target resource.
    #[error("{0}")]
    Unauthorized(String),

    /// Room, message, or connection unknown.
    #[error("{0}")]
    NotFound(String),

    /// Undecodable or invalid event payload.
    #[error("malformed event: {0}")]
    Malformed(String),

    /// The persistence or identity collaborator failed.
    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl EventError {
    /// Stable wire identifier for the `error` event's `kind` field.
    pub fn kind(&self) -> &'static str {
        match self {
            EventError::Unauthenticated => "unauthenticated",
            EventError::Unauthorized(_) => "unauthorized",
            EventError::NotFound(_) => "not_found",
            EventError::Malformed(_) => "malformed",
            EventError::Upstream(_) => "upstream_failure",
        }
    }
}

impl From<ValidationError> for EventError {
    fn from(e: ValidationError) -> Self {
        EventError::Malformed(e.to_string())
    }
}

impl From<StoreError> for EventError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => EventError::NotFound("record not found".to_string()),
            StoreError::Unavailable(detail) => EventError::Upstream(detail),
        }
    }
}

impl From<AuthError> for EventError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => EventError::Unauthenticated,
            AuthError::Unavailable(detail) => EventError::Upstream(detail),
        }
    }
}
