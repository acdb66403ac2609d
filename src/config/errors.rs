//! Configuration errors

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required keys have no value
    #[error(
        "Configuration is incomplete.\nUpdate {} and set values for: {}.{}\nThen run the command again.",
        .path.display(),
        .missing.join(", "),
        added_note(.path, .added)
    )]
    Incomplete {
        path: PathBuf,
        missing: Vec<String>,
        /// Keys appended to the file as templates during this load
        added: Vec<String>,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn added_note(path: &Path, added: &[String]) -> String {
    if added.is_empty() {
        String::new()
    } else {
        format!("\nAdded missing keys to {}: {}.", path.display(), added.join(", "))
    }
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Keys that must be filled in, empty for I/O failures
    pub fn missing_keys(&self) -> &[String] {
        match self {
            Self::Incomplete { missing, .. } => missing,
            Self::Io { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_message_lists_missing_keys() {
        let err = ConfigError::Incomplete {
            path: PathBuf::from(".env"),
            missing: vec!["DA_CLIENT_ID".into(), "DA_CLIENT_SECRET".into()],
            added: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Configuration is incomplete.\nUpdate .env and set values for: DA_CLIENT_ID, DA_CLIENT_SECRET.\nThen run the command again."
        );
        assert_eq!(err.missing_keys().len(), 2);
    }

    #[test]
    fn test_incomplete_message_mentions_added_keys() {
        let err = ConfigError::Incomplete {
            path: PathBuf::from("conf/.env"),
            missing: vec!["DA_REDIRECT_URI".into()],
            added: vec!["DA_REDIRECT_URI".into(), "DA_CACHE_DIR".into()],
        };
        let text = err.to_string();
        assert!(text.contains("\nAdded missing keys to conf/.env: DA_REDIRECT_URI, DA_CACHE_DIR.\n"));
        assert!(text.ends_with("Then run the command again."));
    }
}
