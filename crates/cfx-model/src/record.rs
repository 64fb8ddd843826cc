//! Conversion between typed entity rows and Polars DataFrames.

use polars::prelude::DataFrame;

use crate::error::Result;

/// A typed row with a fixed, ordered column schema.
///
/// `from_frame(to_frame(rows))` reproduces `rows` exactly, nulls included;
/// layers rely on this to round-trip through Parquet.
pub trait FrameRecord: Sized {
    /// Column names in schema order.
    const COLUMNS: &'static [&'static str];

    /// Build a DataFrame with exactly [`Self::COLUMNS`], even for zero rows.
    fn to_frame(rows: &[Self]) -> Result<DataFrame>;

    /// Read rows back from a DataFrame holding at least [`Self::COLUMNS`].
    fn from_frame(df: &DataFrame) -> Result<Vec<Self>>;
}
