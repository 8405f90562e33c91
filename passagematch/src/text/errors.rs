// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for passage matching collaborators
//!
//! The matching engine itself never fails; these errors come from the
//! layers that feed it (corpus documents, dataset files, configuration,
//! report export, worker pool setup).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fallible passage matching operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors that can occur around the matching engine
#[derive(Error, Debug)]
pub enum MatchError {
    /// A corpus document could not be read or decoded
    #[error("Unreadable document {path:?}: {reason}")]
    UnreadableDocument { path: PathBuf, reason: String },

    /// A dataset file lacks the passage columns
    #[error("Missing columns in {path:?}: expected one of {expected}")]
    MissingColumns { path: PathBuf, expected: String },

    /// Invalid matcher or batch configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Worker pool could not be created
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MatchError {
    /// Build an `UnreadableDocument` error from anything displayable
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        MatchError::UnreadableDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_display() {
        let err = MatchError::unreadable("book.txt", "not valid UTF-8");
        assert_eq!(
            err.to_string(),
            "Unreadable document \"book.txt\": not valid UTF-8"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MatchError = io.into();
        assert!(matches!(err, MatchError::Io(_)));
    }
}
