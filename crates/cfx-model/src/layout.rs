//! Layer and dataset naming for the on-disk lakehouse layout.
//!
//! Each dataset of each layer lives in its own directory under the layer
//! root (for example `data/silver/countries`), which the layer writer owns
//! and replaces as a unit.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Medallion layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Minimally-typed mirror of the raw input.
    Bronze,
    /// Normalized, typed datasets.
    Silver,
    /// Joined and aggregated datasets.
    Gold,
}

impl Layer {
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named dataset within a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Countries,
    ExchangeRates,
    CountryCurrencySummary,
    CountryRateTimeseries,
}

impl Dataset {
    /// Directory name under the layer root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Dataset::Countries => "countries",
            Dataset::ExchangeRates => "exchange_rates",
            Dataset::CountryCurrencySummary => "country_currency_summary",
            Dataset::CountryRateTimeseries => "country_rate_timeseries",
        }
    }

    /// Stem of the single data file written when the layer is unpartitioned.
    pub fn file_stem(self, layer: Layer) -> String {
        match (self, layer) {
            (Dataset::Countries | Dataset::ExchangeRates, Layer::Bronze) => {
                format!("{}_raw", self.dir_name())
            }
            (Dataset::Countries | Dataset::ExchangeRates, _) => {
                format!("{}_clean", self.dir_name())
            }
            _ => self.dir_name().to_string(),
        }
    }

    /// Whether rows carry country attributes, so country partition columns
    /// such as `region` apply.
    pub fn is_country_keyed(self) -> bool {
        !matches!(self, Dataset::ExchangeRates)
    }

    /// Destination directory of this dataset under `layer_root`.
    pub fn path_in(self, layer_root: &Path) -> PathBuf {
        layer_root.join(self.dir_name())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stems_follow_layer() {
        assert_eq!(Dataset::Countries.file_stem(Layer::Bronze), "countries_raw");
        assert_eq!(Dataset::Countries.file_stem(Layer::Silver), "countries_clean");
        assert_eq!(
            Dataset::CountryCurrencySummary.file_stem(Layer::Gold),
            "country_currency_summary"
        );
    }

    #[test]
    fn rates_are_not_country_keyed() {
        assert!(!Dataset::ExchangeRates.is_country_keyed());
        assert!(Dataset::CountryRateTimeseries.is_country_keyed());
    }
}
