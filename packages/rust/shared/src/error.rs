//! Error types for EAD Bridge.
//!
//! Library crates use [`EadBridgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all EAD Bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum EadBridgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed XML input.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A rule could not be registered (bad pattern, unmet ordering prerequisite).
    #[error("registry error: {message}")]
    Registry { message: String },

    /// A rule handler failed; the whole conversion is abandoned.
    #[error("rule '{pattern}' failed: {source}")]
    Rule {
        pattern: String,
        source: Box<EadBridgeError>,
    },

    /// The record graph was asked to do something inconsistent
    /// (unknown collection for a kind, record attached twice).
    #[error("record graph error: {0}")]
    Graph(String),

    /// No converter is registered for the requested import format.
    #[error("unsupported import format: {0}")]
    UnsupportedFormat(String),

    /// JSON serialization of the output graph failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, EadBridgeError>;

impl EadBridgeError {
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

    /// Create a registry error from any displayable message.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry {
            message: msg.into(),
        }
    }

    /// Wrap a handler failure with the pattern of the rule that raised it.
    pub fn rule(pattern: impl Into<String>, source: EadBridgeError) -> Self {
        Self::Rule {
            pattern: pattern.into(),
            source: Box::new(source),
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

impl From<serde_json::Error> for EadBridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = EadBridgeError::config("missing [defaults] table");
        assert_eq!(err.to_string(), "config error: missing [defaults] table");

        let err = EadBridgeError::UnsupportedFormat("marcxml".into());
        assert!(err.to_string().contains("marcxml"));
    }

    #[test]
    fn rule_error_names_pattern_and_cause() {
        let err = EadBridgeError::rule(
            "accessrestrict/date",
            EadBridgeError::Graph("record 3 is already attached".into()),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("rule 'accessrestrict/date' failed"));
        assert!(msg.contains("already attached"));
    }
}
