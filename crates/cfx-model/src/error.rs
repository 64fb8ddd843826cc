//! Error types for entity and frame conversion.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while converting between typed entities and DataFrames.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Column not found in DataFrame.
    #[error("column '{column}' not found in DataFrame")]
    MissingColumn { column: String },

    /// Column exists but has a dtype the entity cannot read.
    #[error("column '{column}' has unexpected type: {message}")]
    ColumnType { column: String, message: String },

    /// A non-nullable column holds a null.
    #[error("column '{column}' contains a null at row {row}")]
    UnexpectedNull { column: String, row: usize },

    /// A date column holds a value that is not `YYYY-MM-DD`.
    #[error("column '{column}' has invalid date '{value}' at row {row}")]
    InvalidDate {
        column: String,
        value: String,
        row: usize,
    },

    /// Requested rate window is inverted.
    #[error("invalid date window: {start} is after {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// A window of `days` days ending at `end` starts before the earliest
    /// representable date.
    #[error("a {days}-day window ending at {end} is out of range")]
    WindowOutOfRange { end: NaiveDate, days: u32 },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ModelError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
