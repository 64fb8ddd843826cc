//! Loosely-typed records as produced by the sources.

use serde_json::{Map, Value};

/// An untyped field-name to value mapping.
///
/// Fields may be absent, null, or carry a different JSON type from one
/// record to the next; only the normalizer interprets them.
pub type RawRecord = Map<String, Value>;

/// Raw fields emitted per country by the countries source.
pub const COUNTRY_RAW_FIELDS: &[&str] = &[
    "country_name",
    "cca2",
    "cca3",
    "region",
    "subregion",
    "population",
    "lat",
    "lng",
    "currencies",
];

/// Raw fields emitted per observation by the rates source.
pub const RATE_RAW_FIELDS: &[&str] = &["date", "currency_code", "rate", "base"];

/// Build a column manifest: `declared` first, then any other key seen in
/// `records`, in first-seen order.
pub fn column_manifest(declared: &[&str], records: &[RawRecord]) -> Vec<String> {
    let mut columns: Vec<String> = declared.iter().map(|name| (*name).to_string()).collect();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|existing| existing == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
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

    #[test]
    fn manifest_appends_unknown_keys_in_first_seen_order() {
        let records = vec![
            record(json!({"cca3": "BRA", "flag": "br"})),
            record(json!({"capital": "Paris", "flag": "fr"})),
        ];
        let columns = column_manifest(&["cca2", "cca3"], &records);
        assert_eq!(columns, vec!["cca2", "cca3", "flag", "capital"]);
    }

    #[test]
    fn manifest_of_empty_input_is_declared_fields() {
        let columns = column_manifest(RATE_RAW_FIELDS, &[]);
        assert_eq!(columns.len(), RATE_RAW_FIELDS.len());
    }
}
