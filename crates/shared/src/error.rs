use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    NotFound,
    Validation,
    Conflict,
    Server,
    Decode,
    InvalidConfig,
}

impl ErrorCode {
    /// Maps a non-success HTTP status to the closest code.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            409 => Self::Conflict,
            _ => Self::Server,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
