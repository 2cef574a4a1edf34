//! Error types for the analyzer library

use std::path::PathBuf;

/// Errors raised by the analysis stages.
///
/// Only `MissingSource` and `Schema` abort a stage. `MalformedRecord`,
/// `OutputAlreadyExists` and `InsufficientComponentSize` are recoverable and
/// are normally converted into a [`crate::diagnostics::Warning`] by the caller.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Source file not found: {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Output already exists: {}", path.display())]
    OutputAlreadyExists { path: PathBuf },

    #[error("Component of size {size} is below the minimum of {min_size}")]
    InsufficientComponentSize { size: usize, min_size: usize },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
