//! Gold-layer aggregates.

use chrono::NaiveDate;
use polars::prelude::DataFrame;

use crate::error::{ModelError, Result};
use crate::polars_utils::{
    f64_column, f64_values, i64_column, i64_values, required_string_values, string_column,
    string_values,
};
use crate::record::FrameRecord;
use crate::window::{format_date, parse_date};

/// One country joined with the rate statistics of its canonical currency.
///
/// Every row traces to exactly one silver country. When the country has no
/// currency, or the currency has no observation in the window, the metric
/// fields are `None` and `observation_count` is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldAggregate {
    pub country_name: String,
    pub cca2: Option<String>,
    pub cca3: Option<String>,
    pub region: String,
    pub subregion: String,
    pub population: Option<i64>,
    pub currency_code: Option<String>,
    pub base_currency: String,
    pub latest_date: Option<NaiveDate>,
    pub latest_rate: Option<f64>,
    pub average_rate: Option<f64>,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub observation_count: i64,
    /// Units of the currency per one euro.
    pub rate_vs_eur: Option<f64>,
    /// Percent change from the first to the latest observation.
    pub pct_change: Option<f64>,
}

impl GoldAggregate {
    /// True when no observation matched the country's currency.
    pub fn is_unmatched(&self) -> bool {
        self.observation_count == 0
    }
}

/// One country's rate on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTimeseriesRow {
    pub date: NaiveDate,
    pub country_name: String,
    pub cca3: Option<String>,
    pub region: String,
    pub subregion: String,
    pub currency_code: String,
    pub base_currency: String,
    pub rate: f64,
}

fn optional_dates(column: &str, values: Vec<Option<String>>) -> Result<Vec<Option<NaiveDate>>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => parse_date(&text)
                .map(Some)
                .ok_or_else(|| ModelError::InvalidDate {
                    column: column.to_string(),
                    value: text,
                    row,
                }),
        })
        .collect()
}

impl FrameRecord for GoldAggregate {
    const COLUMNS: &'static [&'static str] = &[
        "country_name",
        "cca2",
        "cca3",
        "region",
        "subregion",
        "population",
        "currency_code",
        "base_currency",
        "latest_date",
        "latest_rate",
        "average_rate",
        "min_rate",
        "max_rate",
        "observation_count",
        "rate_vs_eur",
        "pct_change",
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
            string_column(
                "currency_code",
                rows.iter().map(|r| r.currency_code.clone()).collect(),
            ),
            string_column(
                "base_currency",
                rows.iter().map(|r| Some(r.base_currency.clone())).collect(),
            ),
            string_column(
                "latest_date",
                rows.iter().map(|r| r.latest_date.map(format_date)).collect(),
            ),
            f64_column("latest_rate", rows.iter().map(|r| r.latest_rate).collect()),
            f64_column("average_rate", rows.iter().map(|r| r.average_rate).collect()),
            f64_column("min_rate", rows.iter().map(|r| r.min_rate).collect()),
            f64_column("max_rate", rows.iter().map(|r| r.max_rate).collect()),
            i64_column(
                "observation_count",
                rows.iter().map(|r| Some(r.observation_count)).collect(),
            ),
            f64_column("rate_vs_eur", rows.iter().map(|r| r.rate_vs_eur).collect()),
            f64_column("pct_change", rows.iter().map(|r| r.pct_change).collect()),
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
        let currency = string_values(df, "currency_code")?;
        let base = required_string_values(df, "base_currency")?;
        let latest_date = optional_dates("latest_date", string_values(df, "latest_date")?)?;
        let latest_rate = f64_values(df, "latest_rate")?;
        let average_rate = f64_values(df, "average_rate")?;
        let min_rate = f64_values(df, "min_rate")?;
        let max_rate = f64_values(df, "max_rate")?;
        let counts = i64_values(df, "observation_count")?;
        let rate_vs_eur = f64_values(df, "rate_vs_eur")?;
        let pct_change = f64_values(df, "pct_change")?;

        let mut rows = Vec::with_capacity(df.height());
        for (row, country_name) in names.into_iter().enumerate() {
            rows.push(GoldAggregate {
                country_name,
                cca2: cca2[row].clone(),
                cca3: cca3[row].clone(),
                region: region[row].clone(),
                subregion: subregion[row].clone(),
                population: population[row],
                currency_code: currency[row].clone(),
                base_currency: base[row].clone(),
                latest_date: latest_date[row],
                latest_rate: latest_rate[row],
                average_rate: average_rate[row],
                min_rate: min_rate[row],
                max_rate: max_rate[row],
                observation_count: counts[row].unwrap_or_default(),
                rate_vs_eur: rate_vs_eur[row],
                pct_change: pct_change[row],
            });
        }
        Ok(rows)
    }
}

impl FrameRecord for RateTimeseriesRow {
    const COLUMNS: &'static [&'static str] = &[
        "date",
        "country_name",
        "cca3",
        "region",
        "subregion",
        "currency_code",
        "base_currency",
        "rate",
    ];

    fn to_frame(rows: &[Self]) -> Result<DataFrame> {
        let columns = vec![
            string_column(
                "date",
                rows.iter().map(|r| Some(format_date(r.date))).collect(),
            ),
            string_column(
                "country_name",
                rows.iter().map(|r| Some(r.country_name.clone())).collect(),
            ),
            string_column("cca3", rows.iter().map(|r| r.cca3.clone()).collect()),
            string_column(
                "region",
                rows.iter().map(|r| Some(r.region.clone())).collect(),
            ),
            string_column(
                "subregion",
                rows.iter().map(|r| Some(r.subregion.clone())).collect(),
            ),
            string_column(
                "currency_code",
                rows.iter().map(|r| Some(r.currency_code.clone())).collect(),
            ),
            string_column(
                "base_currency",
                rows.iter().map(|r| Some(r.base_currency.clone())).collect(),
            ),
            f64_column("rate", rows.iter().map(|r| Some(r.rate)).collect()),
        ];
        Ok(DataFrame::new(columns)?)
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let dates = optional_dates("date", string_values(df, "date")?)?;
        let names = required_string_values(df, "country_name")?;
        let cca3 = string_values(df, "cca3")?;
        let region = required_string_values(df, "region")?;
        let subregion = required_string_values(df, "subregion")?;
        let currency = required_string_values(df, "currency_code")?;
        let base = required_string_values(df, "base_currency")?;
        let rates = f64_values(df, "rate")?;

        let mut rows = Vec::with_capacity(df.height());
        for (row, country_name) in names.into_iter().enumerate() {
            let date = dates[row].ok_or_else(|| ModelError::UnexpectedNull {
                column: "date".to_string(),
                row,
            })?;
            let rate = rates[row].ok_or_else(|| ModelError::UnexpectedNull {
                column: "rate".to_string(),
                row,
            })?;
            rows.push(RateTimeseriesRow {
                date,
                country_name,
                cca3: cca3[row].clone(),
                region: region[row].clone(),
                subregion: subregion[row].clone(),
                currency_code: currency[row].clone(),
                base_currency: base[row].clone(),
                rate,
            });
        }
        Ok(rows)
    }
}
