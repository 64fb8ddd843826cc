//! Pipeline configuration.
//!
//! Settings come from three places, later ones winning: the defaults in
//! [`PipelineConfig::default`], an optional TOML file, and command-line
//! flags. The merged config is resolved against the current date into
//! [`PipelineOptions`], which is what the pipeline consumes.
//!
//! ```toml
//! bronze_dir = "data/bronze"
//! partition_cols = ["region"]
//! window_days = 10
//! symbols = ["USD", "BRL"]
//! compression = "zstd"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use cfx_extract::{FRANKFURTER_URL, MAX_WINDOW_DAYS, REST_COUNTRIES_URL};
use cfx_layer::Compression;
use cfx_model::currency::{EUR, normalize_currency_code};
use cfx_model::{RatesWindow, format_date, parse_date};

/// Days covered by the default rates window (end date included).
pub const DEFAULT_WINDOW_DAYS: u32 = 10;

/// Default HTTP timeout, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedWindow { start: String, end: String },

    #[error("window spans {days} days, the maximum is {max}")]
    WindowTooLong { days: i64, max: i64 },

    #[error("invalid base currency '{0}'")]
    InvalidBase(String),

    #[error("http_timeout_secs must be greater than zero")]
    ZeroTimeout,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// File-level configuration; every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub bronze_dir: PathBuf,
    pub silver_dir: PathBuf,
    pub gold_dir: PathBuf,
    /// Partition columns for country-keyed datasets; empty disables
    /// partitioning.
    pub partition_cols: Vec<String>,
    pub overwrite: bool,
    pub skip_gold: bool,
    /// `YYYY-MM-DD`; defaults to `window_days - 1` days before the end.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`; defaults to the current date.
    pub end_date: Option<String>,
    pub window_days: u32,
    /// Target currencies; empty requests every currency.
    pub symbols: Vec<String>,
    pub base: String,
    /// Read countries from this JSON file instead of HTTP.
    pub countries_file: Option<PathBuf>,
    /// Read rates from this JSON file instead of HTTP.
    pub rates_file: Option<PathBuf>,
    pub compression: Compression,
    pub http_timeout_secs: u64,
    pub countries_url: String,
    pub rates_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bronze_dir: PathBuf::from("data/bronze"),
            silver_dir: PathBuf::from("data/silver"),
            gold_dir: PathBuf::from("data/gold"),
            partition_cols: vec!["region".to_string()],
            overwrite: false,
            skip_gold: false,
            start_date: None,
            end_date: None,
            window_days: DEFAULT_WINDOW_DAYS,
            symbols: Vec::new(),
            base: EUR.to_string(),
            countries_file: None,
            rates_file: None,
            compression: Compression::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            countries_url: REST_COUNTRIES_URL.to_string(),
            rates_url: FRANKFURTER_URL.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a config file. Missing keys take their defaults; unknown keys
    /// are rejected.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Resolve dates and validate, using `today` as the default end date.
    pub fn options(&self, today: NaiveDate) -> Result<PipelineOptions> {
        let end = match &self.end_date {
            Some(value) => date_field("end_date", value)?,
            None => today,
        };
        let window = match &self.start_date {
            Some(value) => {
                let start = date_field("start_date", value)?;
                RatesWindow::new(start, end).map_err(|_| ConfigError::InvertedWindow {
                    start: format_date(start),
                    end: format_date(end),
                })?
            }
            None => {
                let span = i64::from(self.window_days.saturating_sub(1));
                if span > MAX_WINDOW_DAYS {
                    return Err(ConfigError::WindowTooLong {
                        days: span,
                        max: MAX_WINDOW_DAYS,
                    });
                }
                RatesWindow::ending_at(end, self.window_days).map_err(|_| {
                    ConfigError::WindowTooLong {
                        days: span,
                        max: MAX_WINDOW_DAYS,
                    }
                })?
            }
        };
        let span = window.len_days() - 1;
        if span > MAX_WINDOW_DAYS {
            return Err(ConfigError::WindowTooLong {
                days: span,
                max: MAX_WINDOW_DAYS,
            });
        }

        let base = normalize_currency_code(&self.base)
            .ok_or_else(|| ConfigError::InvalidBase(self.base.clone()))?;
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut partition_cols: Vec<String> = Vec::with_capacity(self.partition_cols.len());
        for column in &self.partition_cols {
            let column = column.trim();
            if !column.is_empty() && !partition_cols.iter().any(|c| c == column) {
                partition_cols.push(column.to_string());
            }
        }

        Ok(PipelineOptions {
            bronze_dir: self.bronze_dir.clone(),
            silver_dir: self.silver_dir.clone(),
            gold_dir: self.gold_dir.clone(),
            partition_cols,
            overwrite: self.overwrite,
            skip_gold: self.skip_gold,
            window,
            base,
            compression: self.compression,
        })
    }
}

fn date_field(field: &'static str, value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| ConfigError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Resolved settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub bronze_dir: PathBuf,
    pub silver_dir: PathBuf,
    pub gold_dir: PathBuf,
    pub partition_cols: Vec<String>,
    pub overwrite: bool,
    pub skip_gold: bool,
    pub window: RatesWindow,
    pub base: String,
    pub compression: Compression,
}

impl PipelineOptions {
    /// Options rooted at `root` (`root/bronze`, `root/silver`, `root/gold`)
    /// with every other setting at its default.
    pub fn rooted_at(root: &Path, window: RatesWindow) -> Self {
        Self {
            bronze_dir: root.join("bronze"),
            silver_dir: root.join("silver"),
            gold_dir: root.join("gold"),
            partition_cols: vec!["region".to_string()],
            overwrite: false,
            skip_gold: false,
            window,
            base: EUR.to_string(),
            compression: Compression::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn default_window_is_ten_days_ending_today() {
        let options = PipelineConfig::default()
            .options(day("2024-03-10"))
            .unwrap();
        assert_eq!(options.window.start(), day("2024-03-01"));
        assert_eq!(options.window.end(), day("2024-03-10"));
        assert_eq!(options.partition_cols, vec!["region"]);
        assert_eq!(options.base, "EUR");
    }

    #[test]
    fn toml_overrides_selected_fields() {
        let config = PipelineConfig::from_toml(
            r#"
            silver_dir = "/tmp/silver"
            partition_cols = []
            start_date = "2024-01-01"
            end_date = "2024-01-31"
            compression = "zstd"
            base = "usd"
            "#,
        )
        .unwrap();
        assert_eq!(config.bronze_dir, PathBuf::from("data/bronze"));
        let options = config.options(day("2030-01-01")).unwrap();
        assert_eq!(options.silver_dir, PathBuf::from("/tmp/silver"));
        assert!(options.partition_cols.is_empty());
        assert_eq!(options.window.len_days(), 31);
        assert_eq!(options.compression, Compression::Zstd);
        assert_eq!(options.base, "USD");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PipelineConfig::from_toml("silver = \"x\"").is_err());
    }

    #[test]
    fn inverted_and_oversized_windows_fail() {
        let mut config = PipelineConfig {
            start_date: Some("2024-02-01".to_string()),
            end_date: Some("2024-01-01".to_string()),
            ..PipelineConfig::default()
        };
        let err = config.options(day("2024-01-01")).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedWindow { .. }));

        config.start_date = Some("2022-01-01".to_string());
        config.end_date = Some("2024-01-01".to_string());
        let err = config.options(day("2024-01-01")).unwrap_err();
        assert!(matches!(err, ConfigError::WindowTooLong { .. }));
    }

    #[test]
    fn oversized_window_days_is_an_error() {
        let config = PipelineConfig::from_toml("window_days = 4000000000").unwrap();
        let err = config.options(day("2024-01-01")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowTooLong {
                days: 3_999_999_999,
                ..
            }
        ));

        let config = PipelineConfig {
            window_days: 366,
            ..PipelineConfig::default()
        };
        assert_eq!(config.options(day("2024-12-31")).unwrap().window.len_days(), 366);
    }

    #[test]
    fn bad_date_names_the_field() {
        let config = PipelineConfig {
            end_date: Some("31/01/2024".to_string()),
            ..PipelineConfig::default()
        };
        let err = config.options(day("2024-01-01")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDate { field: "end_date", .. }));
    }

    #[test]
    fn partition_columns_are_trimmed_and_deduplicated() {
        let config = PipelineConfig {
            partition_cols: vec![" region".into(), "region".into(), "".into(), "subregion".into()],
            ..PipelineConfig::default()
        };
        let options = config.options(day("2024-01-01")).unwrap();
        assert_eq!(options.partition_cols, vec!["region", "subregion"]);
    }
}
