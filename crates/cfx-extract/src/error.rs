//! Error types for extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort extraction.
///
/// Every variant is fatal for the run: the orchestrator stops at the extract
/// stage and no layer is written.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Transport failure (connect, timeout, TLS).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The body could not be decoded as JSON.
    #[error("could not decode response from {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// The body decoded but does not carry usable data.
    #[error("unusable payload from {source_name}: {reason}")]
    Payload { source_name: String, reason: String },

    /// Failed to read a local input file.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request parameters are rejected before any I/O.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
