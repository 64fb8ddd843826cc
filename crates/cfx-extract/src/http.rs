//! Blocking HTTP plumbing shared by the REST extractors.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::{ExtractionError, Result};

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT_VALUE: &str = concat!("cfx-etl/", env!("CARGO_PKG_VERSION"));

/// Build a client with a bounded timeout.
pub(crate) fn client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ExtractionError::Http {
            url: String::from("<client>"),
            source,
        })
}

/// GET `url` and decode the body as JSON.
///
/// Non-success statuses become [`ExtractionError::Status`] carrying the
/// start of the response body.
pub(crate) fn get_json(client: &Client, url: &reqwest::Url, source_name: &str) -> Result<Value> {
    debug!(source = source_name, url = %url, "GET");

    let response = client
        .get(url.clone())
        .header(USER_AGENT, USER_AGENT_VALUE)
        .header(ACCEPT, "application/json")
        .send()
        .map_err(|source| ExtractionError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ExtractionError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    let text = response.text().map_err(|source| ExtractionError::Http {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|e| ExtractionError::Decode {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Parse `base` and append query parameters.
pub(crate) fn url_with_params(base: &str, params: &[(&str, String)]) -> Result<reqwest::Url> {
    reqwest::Url::parse_with_params(base, params).map_err(|e| ExtractionError::InvalidRequest {
        reason: format!("invalid URL {base}: {e}"),
    })
}
