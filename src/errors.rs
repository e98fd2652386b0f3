//! Error types shared by extraction, generation and invocation.
//!
//! Extraction failures (`SourceUnavailable`, `MalformedSource`) are never
//! recovered locally: they abort the whole extraction and propagate to the
//! caller. Unresolved annotation names are not errors at all; they are
//! dropped during relevant-type discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for implement operations
#[derive(Debug, Error)]
pub enum Error {
    /// The declaration text of a function or type cannot be located
    #[error("Source unavailable for {name}: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// Declaration text was found but does not parse
    #[error("Malformed source at {line}:{column}: {message}")]
    MalformedSource {
        line: usize,
        column: usize,
        message: String,
    },

    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote generation call failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// The model answered with something we cannot use
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// The external formatter rejected the generated code
    #[error("Formatter '{program}' failed: {message}")]
    Formatter { program: String, message: String },

    /// Running a persisted implementation failed
    #[error("Calling {function} failed: {message}")]
    Invocation { function: String, message: String },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a source-unavailable error for a named declaration
    pub fn source_unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error with a 1-based location
    pub fn malformed(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::MalformedSource {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
