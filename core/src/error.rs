//! Crate-boundary error type.
//!
//! `pinelint-core` never produces a hard failure for malformed Pine source —
//! lexical/parse trouble becomes a `Diagnostic`. `CoreError`
//! exists for the handful of things that really are programmer/environment
//! errors: a source file that isn't readable, or a review budget that was
//! configured to something nonsensical.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("source is not valid UTF-8")]
    InvalidEncoding,

    #[error("review budget must be a positive duration")]
    InvalidBudget,

    #[error("reference index entry '{0}' failed to load: {1}")]
    ReferenceIndex(String, String),
}

pub type CoreResult<T> = Result<T, CoreError>;
