//! DeviantArt API errors

use thiserror::Error;

use crate::sync::{CollaboratorError, CollaboratorErrorKind};

/// Result type for DeviantArt API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// DeviantArt API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access token was rejected and could not be replaced
    #[error("{0}")]
    AuthTokenExpired(String),

    #[error("API request failed for {path} (HTTP {status}). Response body: {snippet}")]
    Http {
        status: u16,
        path: String,
        snippet: String,
    },

    #[error("Transport error for {path}: {message}")]
    Transport { path: String, message: String },

    #[error("{0}")]
    InvalidResponse(String),

    #[error("{0}")]
    InvalidGallery(String),

    #[error("{0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn transport(path: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            path: path.to_string(),
            message: source.to_string(),
        }
    }

    /// Collaborator classification of this error
    pub fn kind(&self) -> CollaboratorErrorKind {
        match self {
            Self::AuthTokenExpired(_) => CollaboratorErrorKind::Auth,
            Self::Http { status, .. } => match status {
                401 => CollaboratorErrorKind::Auth,
                403 => CollaboratorErrorKind::Permission,
                404 => CollaboratorErrorKind::NotFound,
                400 | 422 => CollaboratorErrorKind::Validation,
                _ => CollaboratorErrorKind::Network,
            },
            Self::Transport { .. } => CollaboratorErrorKind::Network,
            Self::InvalidResponse(_) => CollaboratorErrorKind::InvalidResponse,
            Self::InvalidGallery(_) | Self::Config(_) => CollaboratorErrorKind::Validation,
        }
    }
}

impl From<ApiError> for CollaboratorError {
    fn from(err: ApiError) -> Self {
        CollaboratorError::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_classification() {
        let http = |status| ApiError::Http {
            status,
            path: "/deviation/x".into(),
            snippet: String::new(),
        };
        assert_eq!(http(404).kind(), CollaboratorErrorKind::NotFound);
        assert_eq!(http(403).kind(), CollaboratorErrorKind::Permission);
        assert_eq!(http(400).kind(), CollaboratorErrorKind::Validation);
        assert_eq!(http(503).kind(), CollaboratorErrorKind::Network);
    }

    #[test]
    fn test_conversion_keeps_message() {
        let err: CollaboratorError =
            ApiError::InvalidResponse("API response for /x was not valid JSON.".into()).into();
        assert_eq!(err.kind, CollaboratorErrorKind::InvalidResponse);
        assert_eq!(err.message, "API response for /x was not valid JSON.");
    }
}
