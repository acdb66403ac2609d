//! # Sync Errors

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of a collaborator failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollaboratorErrorKind {
    /// Connection, timeout, or exhausted transient retries
    Network,
    /// Token missing, invalid, or expired
    Auth,
    /// Document does not exist (anymore)
    NotFound,
    /// Authenticated but not allowed to edit
    Permission,
    /// Service rejected the submitted fields
    Validation,
    /// Response did not have the expected shape
    InvalidResponse,
}

impl CollaboratorErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

impl fmt::Display for CollaboratorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a `ContentSource` or `ContentSink`
///
/// The message is reported verbatim; the core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    pub kind: CollaboratorErrorKind,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(kind: CollaboratorErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::Auth, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CollaboratorErrorKind::NotFound, message)
    }
}

/// Result type for run artifact operations
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Work directory and artifact file errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Workdir path exists and is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Workdir must be empty: {0}")]
    NotEmpty(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_displays_message_verbatim() {
        let err = CollaboratorError::auth("Access token is invalid or expired.");
        assert_eq!(err.to_string(), "Access token is invalid or expired.");
        assert_eq!(err.kind.as_str(), "auth");
    }

    #[test]
    fn test_artifact_error_display() {
        let err = ArtifactError::NotEmpty(PathBuf::from("tmp/sync-1"));
        assert_eq!(err.to_string(), "Workdir must be empty: tmp/sync-1");
    }
}
