//! Error types for qaforge.
//!
//! Library crates use [`QaForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all qaforge operations.
#[derive(Debug, thiserror::Error)]
pub enum QaForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the generation service.
    #[error("network error: {0}")]
    Network(String),

    /// The source document could not be read or decoded.
    #[error("failed to load {path:?}: {message}")]
    Load { path: PathBuf, message: String },

    /// The source document decoded to no text at all.
    #[error("document {path:?} is empty")]
    EmptyDocument { path: PathBuf },

    /// Question generation failed and the fallback strategy does not recover.
    #[error("generation error: {0}")]
    Generation(String),

    /// Console input ended or could not be read.
    #[error("input error: {0}")]
    Input(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// User-supplied value failed validation.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON encoding error while exporting.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QaForgeError>;

impl QaForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a load error for the given document path.
    pub fn load(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
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
