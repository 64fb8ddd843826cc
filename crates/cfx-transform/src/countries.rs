//! Raw country records to silver [`CountryEntity`] rows.

use std::collections::{BTreeMap, HashMap};

use cfx_model::{CountryEntity, FrameRecord, RawRecord, UNKNOWN};
use serde_json::Value;
use tracing::debug;

use crate::currency::resolve_currency;
use crate::error::SchemaError;
use crate::numeric::{coerce_count, coerce_f64};
use crate::report::NormalizationReport;

/// Silver countries plus the report describing how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryNormalization {
    pub countries: Vec<CountryEntity>,
    pub report: NormalizationReport,
}

/// Normalize raw country records.
///
/// Input order is kept. A record with neither `cca2` nor `cca3` is dropped;
/// so is any record reusing a code an earlier record already claimed. Every
/// other anomaly is absorbed: missing fields become nulls, empty categorical
/// fields become [`UNKNOWN`], uncoercible numbers become nulls.
pub fn normalize_countries(records: &[RawRecord]) -> CountryNormalization {
    let mut report = NormalizationReport::new("countries", records.len());
    report.columns = CountryEntity::COLUMNS.len();

    let mut seen_cca2: HashMap<String, usize> = HashMap::new();
    let mut seen_cca3: HashMap<String, usize> = HashMap::new();
    let mut countries = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        let cca2 = code_field(record, "cca2");
        let cca3 = code_field(record, "cca3");
        if cca2.is_none() && cca3.is_none() {
            report.drop_row(SchemaError::Unidentifiable { row });
            continue;
        }

        let clash = [(&cca2, &seen_cca2), (&cca3, &seen_cca3)]
            .into_iter()
            .find_map(|(code, seen)| {
                let code = code.as_ref()?;
                seen.get(code).map(|first_row| (code.clone(), *first_row))
            });
        if let Some((code, first_row)) = clash {
            report.drop_row(SchemaError::DuplicateCode {
                row,
                code,
                first_row,
            });
            continue;
        }
        if let Some(code) = &cca2 {
            seen_cca2.insert(code.clone(), row);
        }
        if let Some(code) = &cca3 {
            seen_cca3.insert(code.clone(), row);
        }

        let region = categorical(record, "region");
        let subregion = categorical(record, "subregion");
        if region.is_none() {
            report.defaulted_region += 1;
        }
        if subregion.is_none() {
            report.defaulted_subregion += 1;
        }

        let currencies = record.get("currencies").unwrap_or(&Value::Null);
        let resolution = resolve_currency(currencies);
        for value in resolution.rejected {
            report.warn(SchemaError::InvalidCurrency { row, value });
        }
        match resolution.candidates {
            0 => report.unresolved_currency += 1,
            1 => {}
            _ => report.multi_currency += 1,
        }

        let (lat, lng) = coordinates(record);
        let country_name = country_name(record)
            .or_else(|| cca3.clone())
            .or_else(|| cca2.clone())
            .unwrap_or_default();

        countries.push(CountryEntity {
            country_name,
            cca2,
            cca3,
            region: region.unwrap_or_else(|| UNKNOWN.to_string()),
            subregion: subregion.unwrap_or_else(|| UNKNOWN.to_string()),
            population: record.get("population").and_then(coerce_count),
            lat,
            lng,
            currency_code: resolution.code,
        });
    }

    report.output_rows = countries.len();
    report.null_counts = null_counts(&countries);
    debug!(
        input = report.input_rows,
        output = report.output_rows,
        "countries normalized"
    );
    CountryNormalization { countries, report }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

fn code_field(record: &RawRecord, field: &str) -> Option<String> {
    non_empty_string(record.get(field)).map(|code| code.to_ascii_uppercase())
}

fn categorical(record: &RawRecord, field: &str) -> Option<String> {
    non_empty_string(record.get(field))
}

/// `country_name`, else `name` as a string or as `{common, official}`.
fn country_name(record: &RawRecord) -> Option<String> {
    non_empty_string(record.get("country_name")).or_else(|| match record.get("name") {
        Some(Value::Object(name)) => {
            non_empty_string(name.get("common")).or_else(|| non_empty_string(name.get("official")))
        }
        other => non_empty_string(other),
    })
}

fn coordinates(record: &RawRecord) -> (Option<f64>, Option<f64>) {
    let pair = record.get("latlng").and_then(Value::as_array);
    let from_pair = |index: usize| pair.and_then(|values| values.get(index)).and_then(coerce_f64);
    let lat = record
        .get("lat")
        .and_then(coerce_f64)
        .or_else(|| from_pair(0));
    let lng = record
        .get("lng")
        .and_then(coerce_f64)
        .or_else(|| from_pair(1));
    (lat, lng)
}

fn null_counts(countries: &[CountryEntity]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = CountryEntity::COLUMNS
        .iter()
        .map(|column| ((*column).to_string(), 0))
        .collect();
    let mut bump = |column: &str, is_null: bool| {
        if is_null {
            *counts.entry(column.to_string()).or_default() += 1;
        }
    };
    for country in countries {
        bump("cca2", country.cca2.is_none());
        bump("cca3", country.cca3.is_none());
        bump("population", country.population.is_none());
        bump("lat", country.lat.is_none());
        bump("lng", country.lng.is_none());
        bump("currency_code", country.currency_code.is_none());
    }
    counts
}
