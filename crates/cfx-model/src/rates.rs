//! Silver exchange-rate observations.

use chrono::NaiveDate;
use polars::prelude::DataFrame;

use crate::error::{ModelError, Result};
use crate::polars_utils::{f64_column, required_string_values, string_column, f64_values};
use crate::record::FrameRecord;
use crate::window::{format_date, parse_date};

/// One `base_currency -> target_currency` rate on one calendar day.
///
/// `rate` is the number of `target_currency` units per one unit of
/// `base_currency`; it is always finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateObservation {
    pub base_currency: String,
    pub target_currency: String,
    pub date: NaiveDate,
    pub rate: f64,
}

impl FrameRecord for ExchangeRateObservation {
    const COLUMNS: &'static [&'static str] = &["base_currency", "target_currency", "date", "rate"];

    fn to_frame(rows: &[Self]) -> Result<DataFrame> {
        let columns = vec![
            string_column(
                "base_currency",
                rows.iter().map(|r| Some(r.base_currency.clone())).collect(),
            ),
            string_column(
                "target_currency",
                rows.iter().map(|r| Some(r.target_currency.clone())).collect(),
            ),
            string_column(
                "date",
                rows.iter().map(|r| Some(format_date(r.date))).collect(),
            ),
            f64_column("rate", rows.iter().map(|r| Some(r.rate)).collect()),
        ];
        Ok(DataFrame::new(columns)?)
    }

    fn from_frame(df: &DataFrame) -> Result<Vec<Self>> {
        let base = required_string_values(df, "base_currency")?;
        let target = required_string_values(df, "target_currency")?;
        let dates = required_string_values(df, "date")?;
        let rates = f64_values(df, "rate")?;

        let mut rows = Vec::with_capacity(df.height());
        for (row, base_currency) in base.into_iter().enumerate() {
            let date = parse_date(&dates[row]).ok_or_else(|| ModelError::InvalidDate {
                column: "date".to_string(),
                value: dates[row].clone(),
                row,
            })?;
            let rate = rates[row].ok_or_else(|| ModelError::UnexpectedNull {
                column: "rate".to_string(),
                row,
            })?;
            rows.push(ExchangeRateObservation {
                base_currency,
                target_currency: target[row].clone(),
                date,
                rate,
            });
        }
        Ok(rows)
    }
}
