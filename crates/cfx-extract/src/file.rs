//! Offline extraction from JSON files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use cfx_model::RawRecord;
use serde_json::Value;
use tracing::{info, warn};

use crate::countries::json_kind;
use crate::error::{ExtractionError, Result};
use crate::extractor::{Extraction, Extractor};

/// Reads records from a JSON file.
///
/// The file holds either an array of objects or an object with a `records`
/// array. Non-object items are skipped with a warning.
#[derive(Debug, Clone)]
pub struct JsonFileExtractor {
    name: String,
    path: PathBuf,
    declared: &'static [&'static str],
}

impl JsonFileExtractor {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        declared: &'static [&'static str],
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            declared,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Extractor for JsonFileExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self) -> Result<Extraction> {
        let text = fs::read_to_string(&self.path).map_err(|source| ExtractionError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        let payload: Value = serde_json::from_str(&text).map_err(|e| ExtractionError::Decode {
            source_name: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        let records = records_from_value(payload, &self.name)?;
        info!(
            source = %self.name,
            path = %self.path.display(),
            records = records.len(),
            "read records from file"
        );
        Ok(Extraction::new(self.declared, records))
    }
}

fn records_from_value(payload: Value, source_name: &str) -> Result<Vec<RawRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut body) => match body.remove("records") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExtractionError::Payload {
                    source_name: source_name.to_string(),
                    reason: "object without a 'records' array".to_string(),
                });
            }
        },
        other => {
            return Err(ExtractionError::Payload {
                source_name: source_name.to_string(),
                reason: format!("expected an array, found {}", json_kind(&other)),
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => warn!(
                source = source_name,
                index,
                kind = json_kind(&other),
                "skipping non-object item"
            ),
        }
    }
    Ok(records)
}
