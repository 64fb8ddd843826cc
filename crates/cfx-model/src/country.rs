//! Silver country entity.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::polars_utils::{
    f64_column, f64_values, i64_column, i64_values, required_string_values, string_column,
    string_values,
};
use crate::record::FrameRecord;

/// Sentinel for missing categorical values.
pub const UNKNOWN: &str = "Unknown";

/// A normalized country row of the silver `countries` dataset.
///
/// At least one of `cca2`/`cca3` is present, both are uppercase, and each is
/// unique across the dataset. `currency_code` is either `None` or three
/// uppercase letters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntity {
    pub country_name: String,
    pub cca2: Option<String>,
    pub cca3: Option<String>,
    /// Region, or [`UNKNOWN`].
    pub region: String,
    /// Subregion, or [`UNKNOWN`].
    pub subregion: String,
    pub population: Option<i64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub currency_code: Option<String>,
}

impl CountryEntity {
    /// The preferred identifier for logs: `cca3`, falling back to `cca2`.
    pub fn code(&self) -> &str {
        self.cca3
            .as_deref()
            .or(self.cca2.as_deref())
            .unwrap_or_default()
    }
}

impl FrameRecord for CountryEntity {
    const COLUMNS: &'static [&'static str] = &[
        "country_name",
        "cca2",
        "cca3",
        "region",
        "subregion",
        "population",
        "lat",
        "lng",
        "currency_code",
    ];

    fn to_frame(rows: &[Self]) -> Result<DataFrame> {
        let columns = vec![
            string_column(
                "country_name",
                rows.iter().map(|r| Some(r.country_name.clone())).collect(),
            ),
            string_column("cca2", rows.iter().map(|r| r.cca2.clone()).collect()),
            string_column("cca3", rows.iter().map(|r| r.cca3.clone()).collect()),
            string_column(
                "region",
                rows.iter().map(|r| Some(r.region.clone())).collect(),
            ),
            string_column(
                "subregion",
                rows.iter().map(|r| Some(r.subregion.clone())).collect(),
            ),
            i64_column("population", rows.iter().map(|r| r.population).collect()),
            f64_column("lat", rows.iter().map(|r| r.lat).collect()),
            f64_column("lng", rows.iter().map(|r| r.lng).collect()),
            string_column(
                "currency_code",
                rows.iter().map(|r| r.currency_code.clone()).collect(),
            ),
        ];
        Ok(DataFrame::new(columns)?)
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let names = required_string_values(df, "country_name")?;
        let cca2 = string_values(df, "cca2")?;
        let cca3 = string_values(df, "cca3")?;
        let region = required_string_values(df, "region")?;
        let subregion = required_string_values(df, "subregion")?;
        let population = i64_values(df, "population")?;
        let lat = f64_values(df, "lat")?;
        let lng = f64_values(df, "lng")?;
        let currency = string_values(df, "currency_code")?;

        let mut rows = Vec::with_capacity(df.height());
        for (idx, country_name) in names.into_iter().enumerate() {
            rows.push(CountryEntity {
                country_name,
                cca2: cca2[idx].clone(),
                cca3: cca3[idx].clone(),
                region: region[idx].clone(),
                subregion: subregion[idx].clone(),
                population: population[idx],
                lat: lat[idx],
                lng: lng[idx],
                currency_code: currency[idx].clone(),
            });
        }
        Ok(rows)
    }
}
