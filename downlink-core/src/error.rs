use thiserror::Error;

/// Failure taxonomy for the orchestration core.
///
/// Steady-state policy is log-and-move-on: `Transport` failures abandon the
/// request or entry that hit them and are never retried. The only retry in
/// the system lives at startup (`Unavailable`, bounded fixed backoff, then
/// fatal).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        CoreError::Transport(err.to_string())
    }
}

impl From<downlink_model::ModelError> for CoreError {
    fn from(err: downlink_model::ModelError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl From<url::ParseError> for CoreError {
    fn from(err: url::ParseError) -> Self {
        CoreError::InvalidInput(format!("malformed url: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
