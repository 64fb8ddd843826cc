//! Data model for the country FX lakehouse.
//!
//! This crate holds the strictly typed side of the pipeline:
//!
//! - [`raw`]: the untyped [`RawRecord`] produced by extractors
//! - [`country`]: the silver [`CountryEntity`]
//! - [`rates`]: the silver [`ExchangeRateObservation`]
//! - [`gold`]: gold aggregates joining countries with rates
//! - [`record`]: the [`FrameRecord`] conversion to and from Polars DataFrames
//! - [`layout`]: layer and dataset naming on disk
//!
//! Everything downstream of normalization works on these types; coercion of
//! raw values happens in `cfx-transform` only.

pub mod country;
pub mod currency;
pub mod error;
pub mod gold;
pub mod layout;
pub mod polars_utils;
pub mod rates;
pub mod raw;
pub mod record;
pub mod window;

pub use country::{CountryEntity, UNKNOWN};
pub use error::{ModelError, Result};
pub use gold::{GoldAggregate, RateTimeseriesRow};
pub use layout::{Dataset, Layer};
pub use rates::ExchangeRateObservation;
pub use raw::{COUNTRY_RAW_FIELDS, RATE_RAW_FIELDS, RawRecord, column_manifest};
pub use record::FrameRecord;
pub use window::{DATE_FORMAT, RatesWindow, format_date, parse_date};
