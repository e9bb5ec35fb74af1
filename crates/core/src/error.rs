use thiserror::Error;

/// Validation errors for core domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid session id {id:?}: {reason}")]
    InvalidSessionId { id: String, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
