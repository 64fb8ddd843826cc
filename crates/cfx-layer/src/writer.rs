//! Atomic layer writes.
//!
//! A layer is written in full into a sibling staging directory and only
//! then swapped into place, so readers see either the previous layer or the
//! new one, never a mix.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::{DataFrame, IdxCa, NewChunkedArray};
use tempfile::{Builder, TempDir};
use tracing::{debug, info, warn};

use crate::compression::Compression;
use crate::error::{LayerError, Result};
use crate::format::{LayerFormat, ParquetFormat};
use crate::manifest::{LayerManifest, ManifestFile, file_sha256, manifest_path, relative_to};
use crate::partition::group_rows;

/// File name of each partition's data file, before the extension.
const PART_FILE_STEM: &str = "part-00000";

/// Where and how one dataset is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    /// Directory the layer owns; replaced as a whole.
    pub destination: PathBuf,
    /// Stem of the data file when the layer is not partitioned.
    pub file_stem: String,
    pub partition_cols: Vec<String>,
    pub overwrite: bool,
}

impl LayerSpec {
    pub fn new(destination: impl Into<PathBuf>, file_stem: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            file_stem: file_stem.into(),
            partition_cols: Vec::new(),
            overwrite: false,
        }
    }

    #[must_use]
    pub fn partitioned_by(mut self, columns: &[String]) -> Self {
        self.partition_cols = columns.to_vec();
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn dataset_name(&self) -> String {
        self.destination
            .file_name()
            .map_or_else(|| self.file_stem.clone(), |n| n.to_string_lossy().into_owned())
    }
}

/// Writer-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    pub compression: Compression,
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerWriteSummary {
    pub destination: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub files: usize,
    /// Partition directories, relative to the destination.
    pub partitions: Vec<String>,
    pub manifest: LayerManifest,
}

/// Writes DataFrames as layers.
pub struct LayerWriter {
    options: WriterOptions,
    format: Box<dyn LayerFormat>,
}

impl LayerWriter {
    /// A Parquet writer with the given options.
    pub fn new(options: WriterOptions) -> Self {
        Self {
            options,
            format: Box::new(ParquetFormat::new(options.compression)),
        }
    }

    /// Use another file format.
    #[must_use]
    pub fn with_format(mut self, format: Box<dyn LayerFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn options(&self) -> WriterOptions {
        self.options
    }

    /// Write `frame` as the layer described by `spec`.
    ///
    /// With `overwrite` the destination's previous content is replaced in
    /// full; without it an existing destination is an error. An empty frame
    /// is written as a single zero-row file carrying the schema.
    pub fn write(&self, frame: &mut DataFrame, spec: &LayerSpec) -> Result<LayerWriteSummary> {
        let started = Instant::now();
        let destination = &spec.destination;

        crate::partition::check_columns(frame, &spec.partition_cols)?;
        if destination.exists() && !spec.overwrite {
            return Err(LayerError::LayerExists {
                path: destination.clone(),
            });
        }

        let name = spec.dataset_name();
        let parent = parent_dir(destination);
        fs::create_dir_all(&parent)
            .map_err(|e| LayerError::storage("create directory", &parent, e))?;

        let staging = Builder::new()
            .prefix(&format!(".{name}.staging-"))
            .tempdir_in(&parent)
            .map_err(|e| LayerError::storage("create staging directory", &parent, e))?;
        debug!(dataset = %name, staging = %staging.path().display(), "staging layer");

        let files = self.write_files(frame, spec, staging.path())?;
        let manifest = LayerManifest {
            dataset: name.clone(),
            rows: frame.height(),
            columns: frame
                .get_column_names()
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            partition_cols: spec.partition_cols.clone(),
            compression: self.options.compression.to_string(),
            files,
        };
        manifest.write_to(staging.path())?;

        swap_into_place(staging, destination, &parent, &name)?;

        let summary = LayerWriteSummary {
            destination: destination.clone(),
            rows: manifest.rows,
            columns: manifest.columns.len(),
            files: manifest.files.len(),
            partitions: manifest.partitions(),
            manifest,
        };
        info!(
            dataset = %name,
            path = %destination.display(),
            rows = summary.rows,
            files = summary.files,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "layer written"
        );
        Ok(summary)
    }

    fn write_files(
        &self,
        frame: &mut DataFrame,
        spec: &LayerSpec,
        root: &Path,
    ) -> Result<Vec<ManifestFile>> {
        let extension = self.format.extension();

        if spec.partition_cols.is_empty() || frame.height() == 0 {
            let path = root.join(format!("{}.{extension}", spec.file_stem));
            self.format.write(frame, &path)?;
            return Ok(vec![describe(root, &path, frame.height())?]);
        }

        let groups = group_rows(frame, &spec.partition_cols)?;
        let mut files = Vec::with_capacity(groups.len());
        for group in groups {
            let dir = root.join(group.relative_dir(&spec.partition_cols));
            fs::create_dir_all(&dir)
                .map_err(|e| LayerError::storage("create directory", &dir, e))?;

            let indices = IdxCa::from_vec("rows".into(), group.rows);
            let mut part = frame.take(&indices)?;
            let path = dir.join(format!("{PART_FILE_STEM}.{extension}"));
            self.format.write(&mut part, &path)?;
            files.push(describe(root, &path, part.height())?);
        }
        Ok(files)
    }
}

impl Default for LayerWriter {
    fn default() -> Self {
        Self::new(WriterOptions::default())
    }
}

fn describe(root: &Path, path: &Path, rows: usize) -> Result<ManifestFile> {
    Ok(ManifestFile {
        path: manifest_path(&relative_to(root, path)),
        rows,
        sha256: file_sha256(path)?,
    })
}

fn parent_dir(destination: &Path) -> PathBuf {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `destination` with the staged directory.
///
/// The previous layer is first moved into a scratch directory; if the
/// staged layer cannot be renamed into place, the previous one is moved
/// back. Both scratch directories are removed on drop.
fn swap_into_place(staging: TempDir, destination: &Path, parent: &Path, name: &str) -> Result<()> {
    let previous = if destination.exists() {
        let holder = Builder::new()
            .prefix(&format!(".{name}.previous-"))
            .tempdir_in(parent)
            .map_err(|e| LayerError::storage("create backup directory", parent, e))?;
        let moved = holder.path().join(name);
        fs::rename(destination, &moved)
            .map_err(|e| LayerError::storage("move previous layer aside", destination, e))?;
        Some((holder, moved))
    } else {
        None
    };

    if let Err(err) = fs::rename(staging.path(), destination) {
        if let Some((_, moved)) = &previous
            && let Err(restore) = fs::rename(moved, destination)
        {
            warn!(
                path = %destination.display(),
                error = %restore,
                "could not restore previous layer"
            );
        }
        return Err(LayerError::storage("rename staged layer", destination, err));
    }

    // The staging path no longer exists, so dropping it removes nothing.
    drop(staging);
    drop(previous);
    Ok(())
}
