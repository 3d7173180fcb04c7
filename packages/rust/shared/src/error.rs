//! Error types for docnav.
//!
//! Library crates use [`DocNavError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docnav operations.
#[derive(Debug, thiserror::Error)]
pub enum DocNavError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport failure while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    /// An expected element (content region, document root) is missing.
    #[error("structural error: {message}")]
    Structural { message: String },

    /// The operation was superseded by a newer navigation.
    #[error("navigation cancelled")]
    Cancelled,

    /// Clipboard write failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Preference storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Selector or URL parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocNavError>;

impl DocNavError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a structural error from any displayable message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Whether this error only signals that a newer navigation took over.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocNavError::config("missing content selector");
        assert_eq!(err.to_string(), "config error: missing content selector");

        let err = DocNavError::Status {
            url: "https://docs.example.com/guide/setup".into(),
            status: 503,
        };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn only_cancelled_is_a_cancellation() {
        assert!(DocNavError::Cancelled.is_cancellation());
        assert!(!DocNavError::Network("reset".into()).is_cancellation());
        assert!(!DocNavError::structural("no main").is_cancellation());
    }
}
