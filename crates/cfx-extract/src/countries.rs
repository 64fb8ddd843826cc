//! REST Countries extractor.

use std::time::Duration;

use cfx_model::{COUNTRY_RAW_FIELDS, RawRecord};
use serde_json::Value;
use tracing::info;

use crate::error::{ExtractionError, Result};
use crate::extractor::{Extraction, Extractor};
use crate::http::{self, DEFAULT_TIMEOUT};

/// Public REST Countries v3.1 endpoint.
pub const REST_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

/// Fields requested from the API.
const REQUESTED_FIELDS: &str = "name,cca2,cca3,currencies,region,subregion,population,latlng";

const SOURCE_NAME: &str = "rest_countries";

/// Fetches every country from REST Countries.
#[derive(Debug, Clone)]
pub struct RestCountriesExtractor {
    url: String,
    timeout: Duration,
}

impl RestCountriesExtractor {
    pub fn new() -> Self {
        Self {
            url: REST_COUNTRIES_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point the extractor at another deployment of the API.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RestCountriesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for RestCountriesExtractor {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn extract(&self) -> Result<Extraction> {
        let client = http::client(self.timeout)?;
        let url = http::url_with_params(&self.url, &[("fields", REQUESTED_FIELDS.to_string())])?;
        let payload = http::get_json(&client, &url, SOURCE_NAME)?;
        let records = parse_countries_payload(payload)?;
        info!(source = SOURCE_NAME, records = records.len(), "fetched countries");
        Ok(Extraction::new(COUNTRY_RAW_FIELDS, records))
    }
}

/// Turn a REST Countries response (a JSON array) into raw records.
pub fn parse_countries_payload(payload: Value) -> Result<Vec<RawRecord>> {
    match payload {
        Value::Array(items) => Ok(items.into_iter().map(flatten_country).collect()),
        other => Err(ExtractionError::Payload {
            source_name: SOURCE_NAME.to_string(),
            reason: format!("expected a JSON array, found {}", json_kind(&other)),
        }),
    }
}

/// Flatten one API object into the raw country fields.
///
/// Values are passed through untouched apart from lifting `name.common`
/// and splitting `latlng`; a non-object item yields an empty record, which
/// the normalizer later drops as unidentifiable.
pub fn flatten_country(item: Value) -> RawRecord {
    let Value::Object(mut source) = item else {
        return RawRecord::new();
    };

    let mut record = RawRecord::new();
    let name = match source.remove("name") {
        Some(Value::Object(mut name)) => name.remove("common").unwrap_or(Value::Null),
        Some(other) => other,
        None => Value::Null,
    };
    record.insert("country_name".to_string(), name);
    for field in ["cca2", "cca3", "region", "subregion", "population"] {
        record.insert(
            field.to_string(),
            source.remove(field).unwrap_or(Value::Null),
        );
    }

    let (lat, lng) = match source.remove("latlng") {
        Some(Value::Array(pair)) => {
            let mut pair = pair.into_iter();
            (
                pair.next().unwrap_or(Value::Null),
                pair.next().unwrap_or(Value::Null),
            )
        }
        _ => (Value::Null, Value::Null),
    };
    record.insert("lat".to_string(), lat);
    record.insert("lng".to_string(), lng);
    record.insert(
        "currencies".to_string(),
        source.remove("currencies").unwrap_or(Value::Null),
    );

    // Anything else the API sends along is kept for the bronze mirror.
    record.extend(source);
    record
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
