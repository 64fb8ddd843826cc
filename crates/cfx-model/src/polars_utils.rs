//! Polars column helpers shared by the entity conversions.
//!
//! Entities are converted column by column: each helper pulls one column out
//! of a DataFrame as a `Vec` of optional native values, reporting a
//! [`ModelError`] instead of panicking when the column is absent or mistyped.

use polars::prelude::{AnyValue, Column, DataFrame, NamedFrom, Series};

use crate::error::{ModelError, Result};

/// Converts a Polars AnyValue to a String representation.
/// Returns None for Null, formats numeric types without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(v.to_string()),
        AnyValue::Int16(v) => Some(v.to_string()),
        AnyValue::Int32(v) => Some(v.to_string()),
        AnyValue::Int64(v) => Some(v.to_string()),
        AnyValue::UInt8(v) => Some(v.to_string()),
        AnyValue::UInt16(v) => Some(v.to_string()),
        AnyValue::UInt32(v) => Some(v.to_string()),
        AnyValue::UInt64(v) => Some(v.to_string()),
        AnyValue::Float32(v) => Some(format_numeric(f64::from(v))),
        AnyValue::Float64(v) => Some(format_numeric(v)),
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Boolean(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| ModelError::MissingColumn {
        column: name.to_string(),
    })
}

fn type_error(name: &str, err: &polars::prelude::PolarsError) -> ModelError {
    ModelError::ColumnType {
        column: name.to_string(),
        message: err.to_string(),
    }
}

/// Read a String column as owned optional values.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column(df, name)?.as_materialized_series();
    let chunked = series.str().map_err(|e| type_error(name, &e))?;
    Ok(chunked
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Read a String column that must not contain nulls.
pub fn required_string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    string_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| ModelError::UnexpectedNull {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Read an Int64 column as optional values.
pub fn i64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = column(df, name)?.as_materialized_series();
    let chunked = series.i64().map_err(|e| type_error(name, &e))?;
    Ok(chunked.into_iter().collect())
}

/// Read a Float64 column as optional values.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(df, name)?.as_materialized_series();
    let chunked = series.f64().map_err(|e| type_error(name, &e))?;
    Ok(chunked.into_iter().collect())
}

pub(crate) fn string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into()
}

pub(crate) fn i64_column(name: &str, values: Vec<Option<i64>>) -> Column {
    Series::new(name.into(), values).into()
}

pub(crate) fn f64_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Series::new(name.into(), values).into()
}
