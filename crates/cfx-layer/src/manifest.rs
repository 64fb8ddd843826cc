//! The `_layer.json` manifest written inside every layer.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LayerError, Result};

/// File name of the manifest inside a layer directory.
pub const MANIFEST_FILE: &str = "_layer.json";

/// Description of a written layer.
///
/// Holds no timestamps or absolute paths, so writing identical data twice
/// yields byte-identical manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    pub dataset: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub partition_cols: Vec<String>,
    pub compression: String,
    pub files: Vec<ManifestFile>,
}

/// One data file of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the layer root, always with `/` separators.
    pub path: String,
    pub rows: usize,
    pub sha256: String,
}

impl LayerManifest {
    pub(crate) fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LayerError::storage("serialize manifest", &path, e))?;
        fs::write(&path, json).map_err(|e| LayerError::storage("write", &path, e))
    }

    /// Partition directories listed in the manifest, in file order.
    pub fn partitions(&self) -> Vec<String> {
        let mut partitions: Vec<String> = self
            .files
            .iter()
            .filter_map(|file| {
                file.path
                    .rsplit_once('/')
                    .map(|(dir, _)| dir.to_string())
            })
            .collect();
        partitions.dedup();
        partitions
    }
}

/// Load the manifest of the layer at `layer_dir`.
pub fn read_manifest(layer_dir: &Path) -> Result<LayerManifest> {
    let path = layer_dir.join(MANIFEST_FILE);
    let text = fs::read_to_string(&path).map_err(|e| LayerError::storage("read", &path, e))?;
    serde_json::from_str(&text).map_err(|e| LayerError::storage("parse manifest", &path, e))
}

/// Compute SHA-256 hash of a file.
pub fn file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| LayerError::storage("open", path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| LayerError::storage("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// `/`-separated form of a path relative to the layer root.
pub(crate) fn manifest_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
