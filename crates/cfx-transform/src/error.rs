//! Error types for normalization.

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

use cfx_model::ModelError;

/// A row-level schema problem.
///
/// These never abort a run: the affected row is dropped (or the offending
/// value ignored) and the error is kept in the
/// [`NormalizationReport`](crate::NormalizationReport).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Neither `cca2` nor `cca3` is present.
    #[error("row {row}: record has neither cca2 nor cca3")]
    Unidentifiable { row: usize },

    /// A code already claimed by an earlier row.
    #[error("row {row}: code {code} already used by row {first_row}")]
    DuplicateCode {
        row: usize,
        code: String,
        first_row: usize,
    },

    /// A currency candidate that is not a three-letter code.
    #[error("row {row}: ignored currency candidate '{value}'")]
    InvalidCurrency { row: usize, value: String },

    #[error("row {row}: invalid date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: date {date} outside the requested window")]
    OutOfWindow { row: usize, date: NaiveDate },

    /// Rate missing, non-numeric, non-finite or not strictly positive.
    #[error("row {row}: invalid rate '{value}'")]
    InvalidRate { row: usize, value: String },

    #[error("row {row}: base {found} does not match the run base {expected}")]
    BaseMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    /// A second observation for the same currency and date.
    #[error("row {row}: duplicate observation for {currency} on {date}")]
    DuplicateObservation {
        row: usize,
        currency: String,
        date: NaiveDate,
    },
}

impl SchemaError {
    /// Stable short name of the error kind, used for report counters.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaError::Unidentifiable { .. } => "unidentifiable",
            SchemaError::DuplicateCode { .. } => "duplicate_code",
            SchemaError::InvalidCurrency { .. } => "invalid_currency",
            SchemaError::InvalidDate { .. } => "invalid_date",
            SchemaError::OutOfWindow { .. } => "out_of_window",
            SchemaError::InvalidRate { .. } => "invalid_rate",
            SchemaError::BaseMismatch { .. } => "base_mismatch",
            SchemaError::DuplicateObservation { .. } => "duplicate_observation",
        }
    }

    /// Index of the input record the error refers to.
    pub fn row(&self) -> usize {
        match self {
            SchemaError::Unidentifiable { row }
            | SchemaError::DuplicateCode { row, .. }
            | SchemaError::InvalidCurrency { row, .. }
            | SchemaError::InvalidDate { row, .. }
            | SchemaError::OutOfWindow { row, .. }
            | SchemaError::InvalidRate { row, .. }
            | SchemaError::BaseMismatch { row, .. }
            | SchemaError::DuplicateObservation { row, .. } => *row,
        }
    }
}

/// Failures that stop a transformation outright.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        TransformError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
