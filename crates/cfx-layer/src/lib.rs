//! Layered Parquet storage for the country FX lakehouse.
//!
//! [`LayerWriter`] writes one DataFrame as one layer directory, optionally
//! split into Hive-style `column=value` partitions:
//!
//! ```text
//! data/silver/countries/
//! ├── _layer.json
//! ├── region=Americas/part-00000.parquet
//! └── region=Europe/part-00000.parquet
//! ```
//!
//! Writes are atomic at the directory level; see [`writer`].

pub mod compression;
pub mod error;
pub mod format;
pub mod manifest;
pub mod partition;
pub mod read;
pub mod writer;

pub use compression::Compression;
pub use error::{LayerError, Result};
pub use format::{LayerFormat, ParquetFormat};
pub use manifest::{LayerManifest, MANIFEST_FILE, ManifestFile, read_manifest};
pub use partition::HIVE_DEFAULT_PARTITION;
pub use read::{layer_files, read_layer, read_layer_with};
pub use writer::{LayerSpec, LayerWriteSummary, LayerWriter, WriterOptions};
