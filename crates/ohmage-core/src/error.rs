//! # Error Types
//!
//! Crate-level error for ohmage-core. Condition and survey errors have their
//! own enums (they are user-facing and carry positions); everything the
//! buffer and record format can raise lands here.

use crate::condition::ConditionError;
use crate::survey::SurveyError;
use thiserror::Error;

/// Errors raised by ohmage-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A condition sentence failed to build or validate.
    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    /// A survey definition failed to compile.
    #[error("survey error: {0}")]
    Survey(#[from] SurveyError),

    /// The embedded database reported an error.
    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Record encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    /// Bytes do not carry a recognised record header.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl CoreError {
    /// Wrap any redb error type (database, transaction, table, storage, commit).
    pub(crate) fn storage(err: impl Into<redb::Error>) -> Self {
        Self::Storage(err.into())
    }
}

/// Result alias for ohmage-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
