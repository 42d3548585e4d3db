//! Error types for askmail.
//!
//! Library crates use [`AskmailError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all askmail collaborator operations.
#[derive(Debug, thiserror::Error)]
pub enum AskmailError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The user input channel is closed or missing.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// Language model client error (network, auth, or response shape).
    #[error("language model error: {0}")]
    Llm(String),

    /// Document rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// A required mail credential is absent or still a placeholder.
    #[error("mail credentials missing: {0}")]
    CredentialsMissing(String),

    /// The artifact handed to the dispatcher no longer exists on disk.
    #[error("attachment not found at {path:?}")]
    AttachmentNotFound { path: PathBuf },

    /// SMTP protocol or network failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AskmailError>;

impl AskmailError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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
