//! Integration tests for the offline JSON file extractor.

use std::fs;

use cfx_extract::{ExtractionError, Extractor, JsonFileExtractor};
use cfx_model::{COUNTRY_RAW_FIELDS, RATE_RAW_FIELDS};
use tempfile::TempDir;

#[test]
fn reads_array_of_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("countries.json");
    fs::write(
        &path,
        r#"[
            {"country_name": "Brazil", "cca2": "BR", "cca3": "BRA", "currencies": {"BRL": {}}},
            {"country_name": "Chile", "cca2": "CL", "flag": "cl"},
            42
        ]"#,
    )
    .unwrap();

    let extraction = JsonFileExtractor::new("countries", &path, COUNTRY_RAW_FIELDS)
        .extract()
        .unwrap();

    assert_eq!(extraction.count(), 2);
    assert_eq!(extraction.columns.len(), COUNTRY_RAW_FIELDS.len() + 1);
    assert_eq!(extraction.columns.last().map(String::as_str), Some("flag"));
}

#[test]
fn reads_records_envelope() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rates.json");
    fs::write(
        &path,
        r#"{"records": [{"date": "2024-01-02", "currency_code": "USD", "rate": 1.09, "base": "EUR"}]}"#,
    )
    .unwrap();

    let extraction = JsonFileExtractor::new("rates", &path, RATE_RAW_FIELDS)
        .extract()
        .unwrap();
    assert_eq!(extraction.count(), 1);
    assert_eq!(extraction.columns, RATE_RAW_FIELDS);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = JsonFileExtractor::new("countries", dir.path().join("nope.json"), COUNTRY_RAW_FIELDS)
        .extract()
        .unwrap_err();
    assert!(matches!(err, ExtractionError::FileRead { .. }));
}

#[test]
fn malformed_json_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{").unwrap();
    let err = JsonFileExtractor::new("countries", &path, COUNTRY_RAW_FIELDS)
        .extract()
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Decode { .. }));
}
