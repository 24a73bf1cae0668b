//! Error type for the ohmage app layer.

use ohmage_core::{ConditionError, CoreError, SurveyError};
use thiserror::Error;

/// Errors raised by CLI commands and the sync adapter.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    #[error("survey error: {0}")]
    Survey(#[from] SurveyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status the client cannot act on.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Tokens were rejected and could not be refreshed.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias for app operations.
pub type Result<T> = std::result::Result<T, AppError>;
