//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 2.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::deviantart::ApiError;
use crate::sync::{ArtifactError, CollaboratorError, CollaboratorErrorKind};

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Missing or unreadable configuration
    ConfigError,
    /// DeviantArt API or OAuth failure
    ApiError,
    /// I/O error (stdout, work directory)
    IoError,
    /// Gallery has no literature documents
    NoDocuments,
    /// Invalid command line
    Usage,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DA_CLI_CONFIG_ERROR",
            Self::ApiError => "DA_CLI_API_ERROR",
            Self::IoError => "DA_CLI_IO_ERROR",
            Self::NoDocuments => "DA_CLI_NO_DOCUMENTS",
            Self::Usage => "DA_CLI_USAGE",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ApiError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// No literature in the selected gallery scope
    pub fn no_documents() -> Self {
        Self::new(
            CliErrorCode::NoDocuments,
            "No literature deviations found in selected gallery scope.",
        )
    }

    /// Usage error
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Usage, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io { .. } => Self::io_error(e.to_string()),
            ConfigError::Incomplete { .. } => Self::config_error(e.to_string()),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Config(_) | ApiError::AuthTokenExpired(_) => Self::config_error(e.to_string()),
            ApiError::InvalidGallery(_) => Self::usage(e.to_string()),
            _ => Self::api_error(e.to_string()),
        }
    }
}

impl From<CollaboratorError> for CliError {
    fn from(e: CollaboratorError) -> Self {
        match e.kind {
            CollaboratorErrorKind::Auth | CollaboratorErrorKind::Validation => {
                Self::config_error(e.message)
            }
            _ => Self::api_error(format!("{} ({})", e.message, e.kind)),
        }
    }
}

impl From<ArtifactError> for CliError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::NotADirectory(_) | ArtifactError::NotEmpty(_) => {
                Self::usage(e.to_string())
            }
            _ => Self::io_error(e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
