//! Dispatcher-boundary error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ResourceExhausted(String),
}

impl DispatchError {
    /// A stable machine-readable tag, embedded in tool-error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidRequest(_) => "invalid_request",
            DispatchError::NotFound(_) => "not_found",
            DispatchError::ResourceExhausted(_) => "resource_exhausted",
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
