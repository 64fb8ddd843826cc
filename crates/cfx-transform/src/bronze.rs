//! Bronze frames: raw records mirrored as nullable text columns.

use cfx_model::RawRecord;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde_json::Value;

use crate::error::Result;

/// Mirror raw records into a DataFrame of nullable String columns.
///
/// Column order follows `columns` (duplicates ignored). JSON strings are
/// stored as-is, other values as their compact JSON text, and null or
/// absent fields as null. No value is corrected.
pub fn bronze_frame(records: &[RawRecord], columns: &[String]) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::with_capacity(columns.len());
    for name in columns {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }

    let frame_columns: Vec<Column> = names
        .into_iter()
        .map(|name| {
            let values: Vec<Option<String>> = records
                .iter()
                .map(|record| record.get(name).and_then(bronze_text))
                .collect();
            Series::new(name.into(), values).into()
        })
        .collect();
    Ok(DataFrame::new(frame_columns)?)
}

fn bronze_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use serde_json::json;

    #[test]
    fn values_are_kept_as_text() {
        let record = match json!({
            "cca3": "BRA",
            "population": 203062512,
            "currencies": {"BRL": {"symbol": "R$"}},
            "region": null
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let columns: Vec<String> = ["cca3", "population", "currencies", "region", "lat"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        let df = bronze_frame(&[record], &columns).unwrap();

        assert_eq!(df.width(), 5);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let text = |name: &str| {
            df.column(name)
                .unwrap()
                .as_materialized_series()
                .str()
                .unwrap()
                .get(0)
                .map(str::to_string)
        };
        assert_eq!(text("population").as_deref(), Some("203062512"));
        assert_eq!(
            text("currencies").as_deref(),
            Some(r#"{"BRL":{"symbol":"R$"}}"#)
        );
        assert_eq!(text("region"), None);
        assert_eq!(text("lat"), None);
    }

    #[test]
    fn empty_input_keeps_columns() {
        let df = bronze_frame(&[], &["date".to_string(), "rate".to_string()]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }
}
