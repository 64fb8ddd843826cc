//! Extractors for the country FX lakehouse.
//!
//! Each source implements [`Extractor`] and hands back an [`Extraction`]:
//! raw records plus a column manifest. Extractors do no normalization; a
//! field keeps whatever JSON type the source sent.
//!
//! - [`RestCountriesExtractor`]: country metadata over HTTP
//! - [`TimeseriesRatesExtractor`]: daily FX rates over HTTP
//! - [`JsonFileExtractor`]: the same records from a local file
//! - [`StaticExtractor`]: records held in memory

pub mod countries;
pub mod error;
pub mod extractor;
pub mod file;
mod http;
pub mod rates;

pub use countries::{
    REST_COUNTRIES_URL, RestCountriesExtractor, flatten_country, parse_countries_payload,
};
pub use error::{ExtractionError, Result};
pub use extractor::{Extraction, Extractor, StaticExtractor};
pub use file::JsonFileExtractor;
pub use http::DEFAULT_TIMEOUT;
pub use rates::{
    FRANKFURTER_URL, MAX_WINDOW_DAYS, RatesRequest, TimeseriesRatesExtractor,
    parse_timeseries_payload,
};
