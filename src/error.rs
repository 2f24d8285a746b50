//! Error types for the extraction pipeline
//!
//! Only two conditions abort a run: the source root cannot be read, or the
//! export destination cannot be written. Everything else is recoverable and is
//! recorded as a [`crate::extraction::Warning`] on the result instead.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiberatorError {
    /// Source root is missing, not a directory, or cannot be traversed
    #[error("Source path is unreadable: {path:?}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// Destination could not be created or written
    #[error("Failed to write output {path:?}: {reason}")]
    OutputWriteFailure { path: PathBuf, reason: String },

    /// Worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("Failed to serialize {what}: {reason}")]
    Serialization { what: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LiberatorError {
    pub fn source_unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::OutputWriteFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LiberatorError>;
