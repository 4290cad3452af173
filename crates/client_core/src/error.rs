use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Raised by non-HTTP catalog clients.
    #[error("{0}")]
    Backend(ApiError),
}

impl CatalogError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidBaseUrl { .. } => ErrorCode::InvalidConfig,
            Self::Transport { .. } => ErrorCode::Transport,
            Self::Status { status, .. } => ErrorCode::from_status(*status),
            Self::Decode { .. } => ErrorCode::Decode,
            Self::Backend(err) => err.code,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::Backend(err) => err,
            other => ApiError::new(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_converts_with_mapped_code() {
        let err = CatalogError::Status {
            url: "http://localhost:8000/events".into(),
            status: 404,
        };
        let api: ApiError = err.into();
        assert_eq!(api.code, ErrorCode::NotFound);
        assert!(api.message.contains("404"));
    }

    #[test]
    fn backend_error_passes_through_unchanged() {
        let original = ApiError::new(ErrorCode::Conflict, "event is full");
        let api: ApiError = CatalogError::Backend(original.clone()).into();
        assert_eq!(api, original);
    }
}
