//! File formats a layer can be stored in.

use std::fs::File;
use std::path::Path;

use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};

use crate::compression::Compression;
use crate::error::{LayerError, Result};

/// Encodes and decodes the data files of a layer.
pub trait LayerFormat: Send + Sync {
    /// File extension, without the dot.
    fn extension(&self) -> &str;

    /// Write `frame` to a new file at `path`.
    fn write(&self, frame: &mut DataFrame, path: &Path) -> Result<()>;

    fn read(&self, path: &Path) -> Result<DataFrame>;
}

/// Apache Parquet via Polars.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetFormat {
    pub compression: Compression,
}

impl ParquetFormat {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }
}

impl LayerFormat for ParquetFormat {
    fn extension(&self) -> &str {
        "parquet"
    }

    fn write(&self, frame: &mut DataFrame, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| LayerError::storage("create", path, e))?;
        ParquetWriter::new(file)
            .with_compression(self.compression.to_parquet())
            .finish(frame)
            .map_err(|e| LayerError::storage("write parquet", path, e))?;
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| LayerError::storage("open", path, e))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| LayerError::storage("read parquet", path, e))
    }
}
