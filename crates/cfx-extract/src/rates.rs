//! Exchange-rate timeseries extractor.
//!
//! Two payload shapes are understood:
//!
//! - `rates`: `{"base": "EUR", "rates": {"2024-01-02": {"USD": 1.09}}}`
//!   (Frankfurter, classic exchangerate.host)
//! - `quotes`: `{"source": "USD", "quotes": {"2024-01-02": {"USDEUR": 0.91}}}`
//!   (currencylayer-style; the source prefix is stripped from each pair)

use std::time::Duration;

use cfx_model::currency::{EUR, normalize_currency_code};
use cfx_model::{RATE_RAW_FIELDS, RatesWindow, RawRecord, format_date};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::countries::json_kind;
use crate::error::{ExtractionError, Result};
use crate::extractor::{Extraction, Extractor};
use crate::http::{self, DEFAULT_TIMEOUT};

/// Public Frankfurter endpoint.
pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app";

/// Longest window accepted by the timeseries endpoint, in days between the
/// two bounds.
pub const MAX_WINDOW_DAYS: i64 = 365;

/// Symbols sent per request when an explicit symbol list is given.
pub const MAX_SYMBOLS_PER_REQUEST: usize = 20;

const SOURCE_NAME: &str = "exchange_rates";

/// Pass-through parameters of a rates request.
#[derive(Debug, Clone, PartialEq)]
pub struct RatesRequest {
    pub window: RatesWindow,
    /// Target currencies; empty means every currency the provider has.
    pub symbols: Vec<String>,
    pub base: String,
    pub timeout: Duration,
}

impl RatesRequest {
    pub fn new(window: RatesWindow) -> Self {
        Self {
            window,
            symbols: Vec::new(),
            base: EUR.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Check the request and return its cleaned symbol list (uppercased,
    /// deduplicated, sorted).
    pub fn validate(&self) -> Result<Vec<String>> {
        let span = (self.window.end() - self.window.start()).num_days();
        if span > MAX_WINDOW_DAYS {
            return Err(ExtractionError::InvalidRequest {
                reason: format!(
                    "window {}..{} spans {span} days, the maximum is {MAX_WINDOW_DAYS}",
                    format_date(self.window.start()),
                    format_date(self.window.end()),
                ),
            });
        }
        if normalize_currency_code(&self.base).is_none() {
            return Err(ExtractionError::InvalidRequest {
                reason: format!("invalid base currency '{}'", self.base),
            });
        }

        let mut symbols = Vec::with_capacity(self.symbols.len());
        for raw in &self.symbols {
            let code =
                normalize_currency_code(raw).ok_or_else(|| ExtractionError::InvalidRequest {
                    reason: format!("invalid currency symbol '{raw}'"),
                })?;
            symbols.push(code);
        }
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

/// Fetches a daily rate timeseries from a Frankfurter-compatible API.
#[derive(Debug, Clone)]
pub struct TimeseriesRatesExtractor {
    base_url: String,
    request: RatesRequest,
}

impl TimeseriesRatesExtractor {
    pub fn new(request: RatesRequest) -> Self {
        Self {
            base_url: FRANKFURTER_URL.to_string(),
            request,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request(&self) -> &RatesRequest {
        &self.request
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}..{}",
            self.base_url.trim_end_matches('/'),
            format_date(self.request.window.start()),
            format_date(self.request.window.end()),
        )
    }
}

impl Extractor for TimeseriesRatesExtractor {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn extract(&self) -> Result<Extraction> {
        let symbols = self.request.validate()?;
        let base = self.request.base.trim().to_ascii_uppercase();
        let client = http::client(self.request.timeout)?;
        let endpoint = self.endpoint();

        let batches: Vec<Option<String>> = if symbols.is_empty() {
            vec![None]
        } else {
            symbols
                .chunks(MAX_SYMBOLS_PER_REQUEST)
                .map(|batch| Some(batch.join(",")))
                .collect()
        };

        let mut records = Vec::new();
        for batch in batches {
            let mut params = vec![("from", base.clone())];
            if let Some(to) = batch {
                params.push(("to", to));
            }
            let url = http::url_with_params(&endpoint, &params)?;
            let payload = http::get_json(&client, &url, SOURCE_NAME)?;
            let parsed = parse_timeseries_payload(&payload, &base)?;
            debug!(source = SOURCE_NAME, observations = parsed.len(), "parsed batch");
            records.extend(parsed);
        }

        info!(
            source = SOURCE_NAME,
            records = records.len(),
            base = %base,
            start = %format_date(self.request.window.start()),
            end = %format_date(self.request.window.end()),
            "fetched rates"
        );
        Ok(Extraction::new(RATE_RAW_FIELDS, records))
    }
}

/// Parse a timeseries payload into `{date, currency_code, rate, base}`
/// records.
///
/// `default_base` is used when the payload does not name its base. Null
/// rates are skipped; every other value is passed through for the
/// normalizer to judge.
pub fn parse_timeseries_payload(payload: &Value, default_base: &str) -> Result<Vec<RawRecord>> {
    let Value::Object(body) = payload else {
        return Err(payload_error(format!(
            "expected a JSON object, found {}",
            json_kind(payload)
        )));
    };

    if body.get("success") == Some(&Value::Bool(false)) {
        let detail = body
            .get("error")
            .map_or_else(|| "no detail".to_string(), Value::to_string);
        return Err(payload_error(format!("provider reported failure: {detail}")));
    }

    if let Some(Value::Object(quotes)) = body.get("quotes") {
        let source = declared_base(body, "source", default_base);
        let mut records = Vec::new();
        for (date, mapping) in quotes {
            for (pair, value) in entries(mapping) {
                let upper = pair.to_ascii_uppercase();
                let Some(code) = upper.strip_prefix(source.as_str()) else {
                    continue;
                };
                if value.is_null() || code.is_empty() {
                    continue;
                }
                records.push(observation(date, code, value, &source));
            }
        }
        return Ok(records);
    }

    if let Some(Value::Object(rates)) = body.get("rates") {
        let base = declared_base(body, "base", default_base);
        let mut records = Vec::new();
        for (date, mapping) in rates {
            for (code, value) in entries(mapping) {
                if value.is_null() {
                    continue;
                }
                records.push(observation(date, &code.to_ascii_uppercase(), value, &base));
            }
        }
        return Ok(records);
    }

    let sample: String = payload.to_string().chars().take(200).collect();
    Err(payload_error(format!(
        "neither 'rates' nor 'quotes' present: {sample}"
    )))
}

fn declared_base(body: &Map<String, Value>, key: &str, default_base: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default_base)
        .trim()
        .to_ascii_uppercase()
}

fn entries(mapping: &Value) -> impl Iterator<Item = (&String, &Value)> {
    mapping.as_object().into_iter().flat_map(|map| map.iter())
}

fn observation(date: &str, code: &str, rate: &Value, base: &str) -> RawRecord {
    let mut record = RawRecord::new();
    record.insert("date".to_string(), Value::String(date.to_string()));
    record.insert("currency_code".to_string(), Value::String(code.to_string()));
    record.insert("rate".to_string(), rate.clone());
    record.insert("base".to_string(), Value::String(base.to_string()));
    record
}

fn payload_error(reason: String) -> ExtractionError {
    ExtractionError::Payload {
        source_name: SOURCE_NAME.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfx_model::parse_date;
    use serde_json::json;

    fn window(start: &str, end: &str) -> RatesWindow {
        RatesWindow::new(parse_date(start).unwrap(), parse_date(end).unwrap()).unwrap()
    }

    #[test]
    fn windows_over_a_year_are_rejected() {
        let request = RatesRequest::new(window("2023-01-01", "2024-01-02"));
        let err = request.validate().unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidRequest { .. }));
        assert!(
            RatesRequest::new(window("2023-01-01", "2024-01-01"))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn symbols_are_cleaned() {
        let mut request = RatesRequest::new(window("2024-01-01", "2024-01-10"));
        request.symbols = vec!["usd".into(), " BRL".into(), "USD".into()];
        assert_eq!(request.validate().unwrap(), vec!["BRL", "USD"]);

        request.symbols = vec!["US$".into()];
        assert!(request.validate().is_err());
    }

    #[test]
    fn endpoint_carries_the_window() {
        let extractor =
            TimeseriesRatesExtractor::new(RatesRequest::new(window("2024-01-01", "2024-01-10")))
                .with_base_url("http://localhost:8080/");
        assert_eq!(
            extractor.endpoint(),
            "http://localhost:8080/2024-01-01..2024-01-10"
        );
    }

    #[test]
    fn quotes_format_strips_source_prefix() {
        let payload = json!({
            "success": true,
            "source": "USD",
            "quotes": {"2024-01-02": {"USDEUR": 0.91, "USDBRL": 4.9, "XAUUSD": 0.0005}}
        });
        let records = parse_timeseries_payload(&payload, "EUR").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r["base"] == json!("USD")));
        assert!(records.iter().any(|r| r["currency_code"] == json!("BRL")));
    }

    #[test]
    fn null_rates_are_skipped() {
        let payload = json!({"rates": {"2024-01-02": {"USD": null, "GBP": 0.86}}});
        let records = parse_timeseries_payload(&payload, "EUR").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["base"], json!("EUR"));
    }
}
