//! Timeseries payload parsing across provider formats.

use cfx_extract::{ExtractionError, parse_timeseries_payload};
use serde_json::json;

#[test]
fn frankfurter_payload_uses_declared_base() {
    let payload = json!({
        "amount": 1.0,
        "base": "EUR",
        "start_date": "2024-01-02",
        "end_date": "2024-01-03",
        "rates": {
            "2024-01-02": {"BRL": 5.37, "USD": 1.0956},
            "2024-01-03": {"BRL": 5.36, "USD": 1.0919}
        }
    });
    let records = parse_timeseries_payload(&payload, "USD").unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r["base"] == json!("EUR")));
    assert_eq!(records[0]["date"], json!("2024-01-02"));
    assert_eq!(records[0]["currency_code"], json!("BRL"));
    assert_eq!(records[0]["rate"], json!(5.37));
}

#[test]
fn provider_failure_is_an_error() {
    let payload = json!({"success": false, "error": {"code": 101, "type": "missing_access_key"}});
    let err = parse_timeseries_payload(&payload, "EUR").unwrap_err();
    match err {
        ExtractionError::Payload { reason, .. } => assert!(reason.contains("missing_access_key")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn payload_without_rates_or_quotes_is_an_error() {
    let err = parse_timeseries_payload(&json!({"message": "not found"}), "EUR").unwrap_err();
    assert!(matches!(err, ExtractionError::Payload { .. }));
}

#[test]
fn empty_rates_is_valid() {
    let records = parse_timeseries_payload(&json!({"base": "EUR", "rates": {}}), "EUR").unwrap();
    assert!(records.is_empty());
}
