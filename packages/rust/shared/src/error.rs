//! Error types for DocHarvest.
//!
//! Library crates use [`DocHarvestError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DocHarvest operations.
#[derive(Debug, thiserror::Error)]
pub enum DocHarvestError {
    /// Rule-file loading or schema error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside the per-URL fetch path.
    #[error("network error: {0}")]
    Network(String),

    /// Headless browser launch or navigation error.
    #[error("browser error: {0}")]
    Browser(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, bad parameter, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Repository archive download or extraction error.
    #[error("archive error: {0}")]
    Archive(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocHarvestError>;

impl DocHarvestError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
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
    fn error_display_formatting() {
        let err = DocHarvestError::config("rule file has a JSON syntax error");
        assert_eq!(
            err.to_string(),
            "config error: rule file has a JSON syntax error"
        );

        let err = DocHarvestError::validation("seed URL has no host");
        assert!(err.to_string().contains("no host"));
    }
}
