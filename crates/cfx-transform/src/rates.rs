//! Raw rate records to silver [`ExchangeRateObservation`] rows.

use std::collections::HashSet;

use chrono::NaiveDate;
use cfx_model::currency::normalize_currency_code;
use cfx_model::{ExchangeRateObservation, FrameRecord, RatesWindow, RawRecord, parse_date};
use serde_json::Value;

use crate::error::SchemaError;
use crate::numeric::coerce_f64;
use crate::report::NormalizationReport;

/// Silver observations plus their report.
#[derive(Debug, Clone, PartialEq)]
pub struct RateNormalization {
    pub observations: Vec<ExchangeRateObservation>,
    pub report: NormalizationReport,
}

/// Normalize raw rate records for one run.
///
/// Every surviving observation carries `base`, has a strictly positive
/// finite rate, and a date inside `window`. The first record for a given
/// (currency, date) wins. Output is sorted by date, then currency.
pub fn normalize_rates(
    records: &[RawRecord],
    window: &RatesWindow,
    base: &str,
) -> RateNormalization {
    let base = base.trim().to_ascii_uppercase();
    let mut report = NormalizationReport::new("exchange_rates", records.len());
    report.columns = ExchangeRateObservation::COLUMNS.len();

    let mut seen: HashSet<(String, NaiveDate)> = HashSet::new();
    let mut observations = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        match observation(row, record, window, &base) {
            Ok(obs) => {
                if seen.insert((obs.target_currency.clone(), obs.date)) {
                    observations.push(obs);
                } else {
                    report.drop_row(SchemaError::DuplicateObservation {
                        row,
                        currency: obs.target_currency,
                        date: obs.date,
                    });
                }
            }
            Err(error) => report.drop_row(error),
        }
    }

    observations.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.target_currency.cmp(&b.target_currency))
    });
    report.output_rows = observations.len();
    report.null_counts = ExchangeRateObservation::COLUMNS
        .iter()
        .map(|column| ((*column).to_string(), 0))
        .collect();
    RateNormalization {
        observations,
        report,
    }
}

fn observation(
    row: usize,
    record: &RawRecord,
    window: &RatesWindow,
    base: &str,
) -> Result<ExchangeRateObservation, SchemaError> {
    let raw_code = record
        .get("currency_code")
        .filter(|value| !value.is_null())
        .or_else(|| record.get("target_currency"))
        .unwrap_or(&Value::Null);
    let target_currency = raw_code
        .as_str()
        .and_then(normalize_currency_code)
        .ok_or_else(|| SchemaError::InvalidCurrency {
            row,
            value: display(raw_code),
        })?;

    if let Some(found) = record.get("base").and_then(Value::as_str) {
        let found = found.trim().to_ascii_uppercase();
        if !found.is_empty() && found != base {
            return Err(SchemaError::BaseMismatch {
                row,
                expected: base.to_string(),
                found,
            });
        }
    }

    let raw_date = record.get("date").unwrap_or(&Value::Null);
    let date = raw_date
        .as_str()
        .and_then(date_prefix)
        .ok_or_else(|| SchemaError::InvalidDate {
            row,
            value: display(raw_date),
        })?;
    if !window.contains(date) {
        return Err(SchemaError::OutOfWindow { row, date });
    }

    let raw_rate = record.get("rate").unwrap_or(&Value::Null);
    let rate = coerce_f64(raw_rate)
        .filter(|rate| *rate > 0.0)
        .ok_or_else(|| SchemaError::InvalidRate {
            row,
            value: display(raw_rate),
        })?;

    Ok(ExchangeRateObservation {
        base_currency: base.to_string(),
        target_currency,
        date,
        rate,
    })
}

/// Parse `YYYY-MM-DD`, accepting a longer RFC 3339 timestamp by its date.
fn date_prefix(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    match text.get(10..11) {
        None => parse_date(text),
        Some("T" | " ") => parse_date(&text[..10]),
        Some(_) => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    fn window() -> RatesWindow {
        RatesWindow::new(
            parse_date("2024-01-01").unwrap(),
            parse_date("2024-01-10").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn timestamps_are_truncated_to_dates() {
        assert_eq!(date_prefix("2024-01-02T00:00:00Z"), parse_date("2024-01-02"));
        assert_eq!(date_prefix("2024-01-02"), parse_date("2024-01-02"));
        assert_eq!(date_prefix("2024-01-02x"), None);
        assert_eq!(date_prefix("02/01/2024"), None);
    }

    #[test]
    fn invalid_rows_are_dropped_with_reasons() {
        let out = normalize_rates(
            &[
                record(json!({"date": "2024-01-02", "currency_code": "usd", "rate": "1.09"})),
                record(json!({"date": "2024-01-02", "currency_code": "BRL", "rate": 0})),
                record(json!({"date": "2023-12-31", "currency_code": "BRL", "rate": 5.3})),
                record(json!({"date": "soon", "currency_code": "BRL", "rate": 5.3})),
                record(json!({"date": "2024-01-02", "currency_code": "US$", "rate": 1.0})),
                record(json!({"date": "2024-01-02", "currency_code": "GBP", "rate": 0.86, "base": "USD"})),
                record(json!({"date": "2024-01-02", "target_currency": "CHF", "rate": 0.93, "base": "eur"})),
            ],
            &window(),
            "EUR",
        );
        assert_eq!(out.observations.len(), 2);
        assert_eq!(out.observations[0].target_currency, "CHF");
        assert_eq!(out.observations[1].target_currency, "USD");
        assert_eq!(out.observations[1].rate, 1.09);
        for kind in [
            "invalid_rate",
            "out_of_window",
            "invalid_date",
            "invalid_currency",
            "base_mismatch",
        ] {
            assert_eq!(out.report.dropped_of(kind), 1, "{kind}");
        }
    }

    #[test]
    fn first_observation_per_day_wins() {
        let out = normalize_rates(
            &[
                record(json!({"date": "2024-01-03", "currency_code": "USD", "rate": 1.1})),
                record(json!({"date": "2024-01-03", "currency_code": "USD", "rate": 1.2})),
                record(json!({"date": "2024-01-02", "currency_code": "USD", "rate": 1.0})),
            ],
            &window(),
            "EUR",
        );
        let rates: Vec<f64> = out.observations.iter().map(|o| o.rate).collect();
        assert_eq!(rates, vec![1.0, 1.1]);
        assert_eq!(out.report.dropped_of("duplicate_observation"), 1);
    }
}
