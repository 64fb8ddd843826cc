//! Layer storage error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing or reading a layer.
///
/// A failed write never leaves a partial layer behind: whatever was at the
/// destination before the call is still there afterwards.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The destination exists and overwriting was not requested.
    #[error("layer already exists at {path} (overwrite not requested)")]
    LayerExists { path: PathBuf },

    /// A requested partition column is not in the frame.
    #[error("partition column '{column}' not found (columns: {available})")]
    MissingPartitionColumn { column: String, available: String },

    /// Filesystem or file-format failure.
    #[error("failed to {operation} {path}: {source}")]
    Storage {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The directory holds no data files.
    #[error("no data files under {path}")]
    EmptyLayer { path: PathBuf },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    Frame { message: String },
}

impl LayerError {
    pub(crate) fn storage(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        LayerError::Storage {
            operation,
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for LayerError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        LayerError::Frame {
            message: err.to_string(),
        }
    }
}

/// Result type for layer operations.
pub type Result<T> = std::result::Result<T, LayerError>;
