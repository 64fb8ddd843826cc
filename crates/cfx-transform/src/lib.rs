//! Normalization for the country FX lakehouse.
//!
//! All coercion and defaulting of raw values happens here; everything
//! downstream works on the typed entities of `cfx-model`.
//!
//! - [`normalize_countries`]: raw countries to silver [`CountryEntity`](cfx_model::CountryEntity) rows
//! - [`normalize_rates`]: raw rates to silver observations
//! - [`bronze_frame`]: raw records mirrored as text columns
//! - [`build_gold`]: the joined gold datasets
//!
//! Row-level problems never raise. They surface as [`SchemaError`]s in the
//! [`NormalizationReport`] returned next to the data.

mod bronze;
mod countries;
pub mod currency;
mod error;
mod gold;
pub mod numeric;
mod rates;
mod report;

pub use bronze::bronze_frame;
pub use countries::{CountryNormalization, normalize_countries};
pub use currency::{CurrencyResolution, resolve_currency};
pub use error::{Result, SchemaError, TransformError};
pub use gold::{GoldDatasets, build_gold};
pub use rates::{RateNormalization, normalize_rates};
pub use report::NormalizationReport;
