//! Error types for the CDP assistant.
//!
//! Library crates use [`AssistantError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all assistant operations.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during a crawl.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Index construction or query error.
    #[error("search error: {0}")]
    Search(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unknown platform, empty crawl, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AssistantError>;

impl AssistantError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a search error from anything displayable (usually a `tantivy` error).
    pub fn search(err: impl std::fmt::Display) -> Self {
        Self::Search(err.to_string())
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
        let err = AssistantError::config("missing data dir");
        assert_eq!(err.to_string(), "config error: missing data dir");

        let err = AssistantError::validation("unknown platform 'hubspot'");
        assert!(err.to_string().contains("hubspot"));

        let err = AssistantError::search("index writer poisoned");
        assert_eq!(err.to_string(), "search error: index writer poisoned");
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AssistantError::io("/tmp/data/segment.json", source);
        assert!(err.to_string().contains("segment.json"));
    }
}
