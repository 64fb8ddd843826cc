//! Parquet compression codec selection.

use std::fmt;
use std::str::FromStr;

use polars::prelude::ParquetCompression;
use serde::{Deserialize, Serialize};

/// Compression codec for layer files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Snappy,
    Zstd,
    Gzip,
    Lz4,
    None,
}

impl Compression {
    pub const ALL: [Compression; 5] = [
        Compression::Snappy,
        Compression::Zstd,
        Compression::Gzip,
        Compression::Lz4,
        Compression::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
            Compression::Gzip => "gzip",
            Compression::Lz4 => "lz4",
            Compression::None => "none",
        }
    }

    pub(crate) fn to_parquet(self) -> ParquetCompression {
        match self {
            Compression::Snappy => ParquetCompression::Snappy,
            Compression::Zstd => ParquetCompression::Zstd(None),
            Compression::Gzip => ParquetCompression::Gzip(None),
            Compression::Lz4 => ParquetCompression::Lz4Raw,
            Compression::None => ParquetCompression::Uncompressed,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "uncompressed" => Ok(Compression::None),
            other => Compression::ALL
                .into_iter()
                .find(|codec| codec.as_str() == other)
                .ok_or_else(|| {
                    format!("unknown compression '{s}' (expected snappy, zstd, gzip, lz4 or none)")
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("ZSTD".parse::<Compression>(), Ok(Compression::Zstd));
        assert_eq!("uncompressed".parse::<Compression>(), Ok(Compression::None));
        assert!("brotli".parse::<Compression>().is_err());
        for codec in Compression::ALL {
            assert_eq!(codec.as_str().parse::<Compression>(), Ok(codec));
        }
    }
}
