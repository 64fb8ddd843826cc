//! Integration tests for layer writes.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use cfx_layer::{
    Compression, HIVE_DEFAULT_PARTITION, LayerError, LayerFormat, LayerSpec, LayerWriter,
    ParquetFormat, WriterOptions, layer_files, read_layer, read_manifest,
};
use cfx_model::polars_utils::any_to_string;
use polars::prelude::{Column, DataFrame, IdxCa, NamedFrom, NewChunkedArray, Series};
use tempfile::TempDir;

fn countries_frame() -> DataFrame {
    let columns: Vec<Column> = vec![
        Series::new(
            "cca3".into(),
            vec![Some("BRA"), Some("FRA"), Some("CHL"), Some("ATA"), Some("DEU")],
        )
        .into(),
        Series::new(
            "region".into(),
            vec![
                Some("Americas"),
                Some("Europe"),
                Some("Americas"),
                None,
                Some("Europe"),
            ],
        )
        .into(),
        Series::new(
            "population".into(),
            vec![
                Some(203_062_512_i64),
                Some(68_000_000),
                None,
                Some(1_000),
                Some(83_000_000),
            ],
        )
        .into(),
    ];
    DataFrame::new(columns).unwrap()
}

fn rows_as_set(df: &DataFrame) -> BTreeSet<Vec<Option<String>>> {
    (0..df.height())
        .map(|i| {
            df.get(i)
                .unwrap()
                .into_iter()
                .map(any_to_string)
                .collect()
        })
        .collect()
}

fn spec(dest: &Path) -> LayerSpec {
    LayerSpec::new(dest, "countries_clean")
}

fn region() -> Vec<String> {
    vec!["region".to_string()]
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn unpartitioned_layer_is_a_single_file() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("silver").join("countries");
    let mut df = countries_frame();

    let summary = LayerWriter::default().write(&mut df, &spec(&dest)).unwrap();

    assert_eq!(summary.rows, 5);
    assert_eq!(summary.files, 1);
    assert_eq!(entries(&dest), vec!["_layer.json", "countries_clean.parquet"]);
    assert!(read_layer(&dest).unwrap().equals_missing(&df));
}

#[test]
fn partitions_follow_hive_layout() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let mut df = countries_frame();

    let summary = LayerWriter::default()
        .write(&mut df, &spec(&dest).partitioned_by(&region()))
        .unwrap();

    let default_dir = format!("region={HIVE_DEFAULT_PARTITION}");
    assert_eq!(
        entries(&dest),
        vec![
            "_layer.json".to_string(),
            "region=Americas".to_string(),
            "region=Europe".to_string(),
            default_dir,
        ]
    );
    assert_eq!(summary.partitions.len(), 3);
    assert!(dest.join("region=Europe/part-00000.parquet").is_file());

    // Partition columns stay inside the files.
    let europe = ParquetFormat::default()
        .read(&dest.join("region=Europe/part-00000.parquet"))
        .unwrap();
    assert_eq!(europe.height(), 2);
    assert!(europe.column("region").is_ok());
}

#[test]
fn partitions_union_to_the_unpartitioned_rows() {
    let tmp = TempDir::new().unwrap();
    let writer = LayerWriter::default();
    let mut df = countries_frame();

    let flat = tmp.path().join("flat");
    let split = tmp.path().join("split");
    writer.write(&mut df, &spec(&flat)).unwrap();
    writer
        .write(&mut df, &spec(&split).partitioned_by(&region()))
        .unwrap();

    let flat_rows = rows_as_set(&read_layer(&flat).unwrap());
    let split_rows = rows_as_set(&read_layer(&split).unwrap());
    assert_eq!(flat_rows, split_rows);
    assert_eq!(split_rows.len(), 5);
}

#[test]
fn null_and_empty_partition_values_keep_every_row() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("bronze_countries");
    let columns: Vec<Column> = vec![
        Series::new("cca3".into(), vec![Some("ATA"), Some("BVT"), Some("FRA")]).into(),
        Series::new("region".into(), vec![None, Some(""), Some("Europe")]).into(),
    ];
    let mut df = DataFrame::new(columns).unwrap();

    let summary = LayerWriter::default()
        .write(&mut df, &spec(&dest).partitioned_by(&region()))
        .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.files, 2);
    let manifest = read_manifest(&dest).unwrap();
    let paths: BTreeSet<&str> = manifest.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths.len(), manifest.files.len());
    assert_eq!(manifest.files.iter().map(|f| f.rows).sum::<usize>(), 3);

    let default_part = ParquetFormat::default()
        .read(&dest.join(format!("region={HIVE_DEFAULT_PARTITION}/part-00000.parquet")))
        .unwrap();
    assert_eq!(default_part.height(), 2);
    assert_eq!(read_layer(&dest).unwrap().height(), 3);
}

#[test]
fn existing_layer_without_overwrite_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let writer = LayerWriter::default();
    writer.write(&mut countries_frame(), &spec(&dest)).unwrap();

    let err = writer
        .write(&mut countries_frame(), &spec(&dest))
        .unwrap_err();
    assert!(matches!(err, LayerError::LayerExists { .. }));
}

#[test]
fn overwrite_removes_stale_partitions() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let writer = LayerWriter::default();
    writer
        .write(&mut countries_frame(), &spec(&dest).partitioned_by(&region()))
        .unwrap();

    let europe_rows = IdxCa::from_vec("rows".into(), vec![1, 4]);
    let mut europe_only = countries_frame().take(&europe_rows).unwrap();
    writer
        .write(
            &mut europe_only,
            &spec(&dest).partitioned_by(&region()).overwrite(true),
        )
        .unwrap();

    assert_eq!(entries(&dest), vec!["_layer.json", "region=Europe"]);
    assert_eq!(read_layer(&dest).unwrap().height(), 2);
    assert_eq!(entries(tmp.path()), vec!["countries"]);
}

#[test]
fn missing_partition_column_fails_before_touching_disk() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let err = LayerWriter::default()
        .write(
            &mut countries_frame(),
            &spec(&dest).partitioned_by(&["continent".to_string()]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        LayerError::MissingPartitionColumn { ref column, .. } if column == "continent"
    ));
    assert!(!dest.exists());
}

#[test]
fn empty_frame_writes_one_schema_file() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let mut empty = countries_frame().head(Some(0));

    let summary = LayerWriter::default()
        .write(&mut empty, &spec(&dest).partitioned_by(&region()))
        .unwrap();

    assert_eq!(summary.rows, 0);
    assert_eq!(entries(&dest), vec!["_layer.json", "countries_clean.parquet"]);
    let back = read_layer(&dest).unwrap();
    assert_eq!(back.height(), 0);
    assert_eq!(back.schema(), empty.schema());
}

#[test]
fn rewriting_identical_data_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let writer = LayerWriter::new(WriterOptions {
        compression: Compression::Zstd,
    });
    let layer = spec(&dest).partitioned_by(&region()).overwrite(true);

    writer.write(&mut countries_frame(), &layer).unwrap();
    let first_manifest = fs::read(dest.join("_layer.json")).unwrap();
    writer.write(&mut countries_frame(), &layer).unwrap();
    let second_manifest = fs::read(dest.join("_layer.json")).unwrap();

    assert_eq!(first_manifest, second_manifest);
    let manifest = read_manifest(&dest).unwrap();
    assert_eq!(manifest.compression, "zstd");
    assert_eq!(manifest.files.len(), 3);
    assert_eq!(manifest.rows, 5);
}

/// Writes a truncated file for the second partition, then fails.
struct FailingFormat {
    calls: std::sync::atomic::AtomicUsize,
}

impl LayerFormat for FailingFormat {
    fn extension(&self) -> &str {
        "parquet"
    }

    fn write(&self, frame: &mut DataFrame, path: &Path) -> cfx_layer::Result<()> {
        let call = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if call == 0 {
            return ParquetFormat::default().write(frame, path);
        }
        fs::write(path, b"PAR1 truncated").unwrap();
        Err(LayerError::Storage {
            operation: "write parquet",
            path: path.to_path_buf(),
            source: "disk full".into(),
        })
    }

    fn read(&self, path: &Path) -> cfx_layer::Result<DataFrame> {
        ParquetFormat::default().read(path)
    }
}

#[test]
fn failed_write_keeps_previous_layer() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("countries");
    let mut original = countries_frame();
    LayerWriter::default()
        .write(&mut original, &spec(&dest))
        .unwrap();
    let before = fs::read(dest.join("countries_clean.parquet")).unwrap();

    let failing = LayerWriter::default().with_format(Box::new(FailingFormat {
        calls: Default::default(),
    }));
    let err = failing
        .write(
            &mut countries_frame(),
            &spec(&dest).partitioned_by(&region()).overwrite(true),
        )
        .unwrap_err();

    assert!(matches!(err, LayerError::Storage { .. }));
    assert_eq!(fs::read(dest.join("countries_clean.parquet")).unwrap(), before);
    assert!(read_layer(&dest).unwrap().equals_missing(&original));
    // No staging directory is left next to the layer.
    assert_eq!(entries(tmp.path()), vec!["countries"]);
    assert_eq!(layer_files(&dest, "parquet").unwrap().len(), 1);
}
