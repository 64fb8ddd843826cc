//! Reading layers back.

use std::fs;
use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use crate::error::{LayerError, Result};
use crate::format::{LayerFormat, ParquetFormat};

/// Every data file under `layer_dir`, in sorted path order.
///
/// Hidden entries (staging directories, dotfiles) are skipped.
pub fn layer_files(layer_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![layer_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| LayerError::storage("list", &dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| LayerError::storage("list", &dir, e))?;
            let path = entry.path();
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == extension) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Read a Parquet layer, stacking its files in sorted path order.
pub fn read_layer(layer_dir: &Path) -> Result<DataFrame> {
    read_layer_with(layer_dir, &ParquetFormat::default())
}

/// Read a layer stored in `format`.
pub fn read_layer_with(layer_dir: &Path, format: &dyn LayerFormat) -> Result<DataFrame> {
    let files = layer_files(layer_dir, format.extension())?;
    let mut frames = files.iter().map(|path| format.read(path));
    let Some(first) = frames.next() else {
        return Err(LayerError::EmptyLayer {
            path: layer_dir.to_path_buf(),
        });
    };
    let mut stacked = first?;
    for frame in frames {
        stacked.vstack_mut(&frame?)?;
    }
    Ok(stacked)
}
