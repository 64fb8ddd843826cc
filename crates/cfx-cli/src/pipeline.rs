//! Batch pipeline with explicit stages.
//!
//! The pipeline runs these stages in order:
//! 1. **Extract**: pull raw countries (and rates, unless gold is skipped)
//! 2. **Normalize**: coerce raw records into silver entities
//! 3. **WriteBronze**: mirror the raw records as text columns
//! 4. **WriteSilver**: persist the typed entities
//! 5. **WriteGold**: persist the country/rate join (optional)
//!
//! Every stage that finishes emits a [`StageReport`] before the next one
//! starts. The first error stops the run; nothing is retried and no state
//! carries over between runs.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use polars::prelude::DataFrame;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use cfx_extract::{Extraction, ExtractionError, Extractor};
use cfx_layer::{LayerError, LayerSpec, LayerWriteSummary, LayerWriter, WriterOptions};
use cfx_model::{
    CountryEntity, Dataset, ExchangeRateObservation, FrameRecord, GoldAggregate, Layer,
    ModelError, RateTimeseriesRow,
};
use cfx_transform::{
    NormalizationReport, TransformError, bronze_frame, build_gold, normalize_countries,
    normalize_rates,
};

use crate::config::PipelineOptions;
use crate::logging::redact_value;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Normalize,
    WriteBronze,
    WriteSilver,
    WriteGold,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Normalize => "normalize",
            Stage::WriteBronze => "write_bronze",
            Stage::WriteSilver => "write_silver",
            Stage::WriteGold => "write_gold",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    /// The stage that follows a successful `self`.
    pub fn next(self, with_gold: bool) -> Stage {
        match self {
            Stage::Extract => Stage::Normalize,
            Stage::Normalize => Stage::WriteBronze,
            Stage::WriteBronze => Stage::WriteSilver,
            Stage::WriteSilver if with_gold => Stage::WriteGold,
            Stage::WriteSilver | Stage::WriteGold => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one completed stage produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub rows: usize,
    pub columns: usize,
    pub datasets: usize,
    pub duration: Duration,
}

/// Row and dataset counts a stage body hands back.
#[derive(Debug, Clone, Copy, Default)]
struct StageCounts {
    rows: usize,
    columns: usize,
    datasets: usize,
}

impl StageCounts {
    fn add(&mut self, rows: usize, columns: usize) {
        self.rows += rows;
        self.columns += columns;
        self.datasets += 1;
    }
}

/// Cause of a stage failure.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// A run that stopped at `stage`.
#[derive(Debug, Error)]
#[error("stage {stage} failed: {source}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub source: StageError,
    /// Reports of the stages that finished before the failure.
    pub completed: Vec<StageReport>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stages: Vec<StageReport>,
    pub countries: NormalizationReport,
    /// `None` when gold was skipped and no rates were extracted.
    pub rates: Option<NormalizationReport>,
    pub layers: Vec<LayerWriteSummary>,
    /// Gold summary rows without any matching rate.
    pub gold_unmatched: usize,
}

impl RunReport {
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|stage| stage.duration).sum()
    }
}

struct Extracted {
    countries: Extraction,
    rates: Option<Extraction>,
}

struct Normalized {
    countries: Vec<CountryEntity>,
    observations: Option<Vec<ExchangeRateObservation>>,
}

/// One configured pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    countries: Box<dyn Extractor>,
    rates: Box<dyn Extractor>,
    writer: LayerWriter,
}

impl Pipeline {
    pub fn new(
        options: PipelineOptions,
        countries: Box<dyn Extractor>,
        rates: Box<dyn Extractor>,
    ) -> Self {
        let writer = LayerWriter::new(WriterOptions {
            compression: options.compression,
        });
        Self {
            options,
            countries,
            rates,
            writer,
        }
    }

    /// Replace the layer writer (for example to change the file format).
    #[must_use]
    pub fn with_writer(mut self, writer: LayerWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn with_gold(&self) -> bool {
        !self.options.skip_gold
    }

    /// Run every stage in order.
    pub fn run(&self) -> Result<RunReport, PipelineFailure> {
        let run_span = info_span!(
            "pipeline",
            start = %self.options.window.start(),
            end = %self.options.window.end(),
            base = %self.options.base,
            skip_gold = self.options.skip_gold,
        );
        let _run_guard = run_span.enter();

        let mut completed = Vec::new();
        let mut layers = Vec::new();

        let extracted = self.step(Stage::Extract, &mut completed, || self.extract())?;

        let (normalized, countries_report, rates_report) =
            self.step(Stage::Normalize, &mut completed, || {
                Ok(self.normalize(&extracted))
            })?;

        let bronze = self.step(Stage::WriteBronze, &mut completed, || {
            self.write_bronze(&extracted)
        })?;
        layers.extend(bronze);

        let silver = self.step(Stage::WriteSilver, &mut completed, || {
            self.write_silver(&normalized)
        })?;
        layers.extend(silver);

        let mut gold_unmatched = 0;
        if self.with_gold() {
            let (gold, unmatched) = self.step(Stage::WriteGold, &mut completed, || {
                self.write_gold(&normalized)
            })?;
            layers.extend(gold);
            gold_unmatched = unmatched;
        }

        info!(
            stage = %Stage::Done,
            layers = layers.len(),
            "pipeline complete"
        );
        Ok(RunReport {
            stages: completed,
            countries: countries_report,
            rates: rates_report,
            layers,
            gold_unmatched,
        })
    }

    /// Run one stage body, timing it and recording its report.
    fn step<T>(
        &self,
        stage: Stage,
        completed: &mut Vec<StageReport>,
        body: impl FnOnce() -> Result<(T, StageCounts), StageError>,
    ) -> Result<T, PipelineFailure> {
        let span = info_span!("stage", stage = %stage);
        let _guard = span.enter();
        let start = Instant::now();

        match body() {
            Ok((value, counts)) => {
                let report = StageReport {
                    stage,
                    rows: counts.rows,
                    columns: counts.columns,
                    datasets: counts.datasets,
                    duration: start.elapsed(),
                };
                info!(
                    stage = %stage,
                    next = %stage.next(self.with_gold()),
                    rows = report.rows,
                    columns = report.columns,
                    datasets = report.datasets,
                    duration_ms = report.duration.as_millis(),
                    "stage complete"
                );
                completed.push(report);
                Ok(value)
            }
            Err(source) => {
                error!(stage = %stage, next = %Stage::Failed, error = %source, "stage failed");
                Err(PipelineFailure {
                    stage,
                    source,
                    completed: std::mem::take(completed),
                })
            }
        }
    }

    fn extract(&self) -> Result<(Extracted, StageCounts), StageError> {
        let mut counts = StageCounts::default();

        let countries = self.countries.extract()?;
        info!(
            source = self.countries.name(),
            records = countries.count(),
            columns = countries.columns.len(),
            "extracted"
        );
        counts.add(countries.count(), countries.columns.len());

        let rates = if self.with_gold() {
            let rates = self.rates.extract()?;
            info!(
                source = self.rates.name(),
                records = rates.count(),
                columns = rates.columns.len(),
                "extracted"
            );
            counts.add(rates.count(), rates.columns.len());
            Some(rates)
        } else {
            debug!("gold disabled, rates not extracted");
            None
        };

        Ok((Extracted { countries, rates }, counts))
    }

    fn normalize(
        &self,
        extracted: &Extracted,
    ) -> (
        (Normalized, NormalizationReport, Option<NormalizationReport>),
        StageCounts,
    ) {
        let mut counts = StageCounts::default();

        let countries = normalize_countries(&extracted.countries.records);
        countries.report.log();
        if let Some(first) = countries.countries.first() {
            debug!(sample = redact_value(&first.country_name), "first country");
        }
        counts.add(countries.countries.len(), countries.report.columns);

        let (observations, rates_report) = match &extracted.rates {
            Some(rates) => {
                let normalized =
                    normalize_rates(&rates.records, &self.options.window, &self.options.base);
                normalized.report.log();
                counts.add(normalized.observations.len(), normalized.report.columns);
                (Some(normalized.observations), Some(normalized.report))
            }
            None => (None, None),
        };

        (
            (
                Normalized {
                    countries: countries.countries,
                    observations,
                },
                countries.report,
                rates_report,
            ),
            counts,
        )
    }

    fn write_bronze(
        &self,
        extracted: &Extracted,
    ) -> Result<(Vec<LayerWriteSummary>, StageCounts), StageError> {
        let root = &self.options.bronze_dir;
        let mut written = Vec::new();

        let mut frame = bronze_frame(
            &extracted.countries.records,
            &extracted.countries.columns,
        )?;
        written.push(self.write_dataset(Layer::Bronze, root, Dataset::Countries, &mut frame)?);

        if let Some(rates) = &extracted.rates {
            let mut frame = bronze_frame(&rates.records, &rates.columns)?;
            written.push(self.write_dataset(
                Layer::Bronze,
                root,
                Dataset::ExchangeRates,
                &mut frame,
            )?);
        }

        Ok(with_counts(written))
    }

    fn write_silver(
        &self,
        normalized: &Normalized,
    ) -> Result<(Vec<LayerWriteSummary>, StageCounts), StageError> {
        let root = &self.options.silver_dir;
        let mut written = Vec::new();

        let mut frame = CountryEntity::to_frame(&normalized.countries)?;
        written.push(self.write_dataset(Layer::Silver, root, Dataset::Countries, &mut frame)?);

        if let Some(observations) = &normalized.observations {
            let mut frame = ExchangeRateObservation::to_frame(observations)?;
            written.push(self.write_dataset(
                Layer::Silver,
                root,
                Dataset::ExchangeRates,
                &mut frame,
            )?);
        }

        Ok(with_counts(written))
    }

    fn write_gold(
        &self,
        normalized: &Normalized,
    ) -> Result<((Vec<LayerWriteSummary>, usize), StageCounts), StageError> {
        let root = &self.options.gold_dir;
        let observations = normalized.observations.as_deref().unwrap_or_default();
        let gold = build_gold(&normalized.countries, observations, &self.options.base);
        if gold.unmatched > 0 {
            warn!(
                unmatched = gold.unmatched,
                countries = gold.summary.len(),
                "countries without a matching rate"
            );
        }

        let mut written = Vec::new();
        let mut summary = GoldAggregate::to_frame(&gold.summary)?;
        written.push(self.write_dataset(
            Layer::Gold,
            root,
            Dataset::CountryCurrencySummary,
            &mut summary,
        )?);
        let mut timeseries = RateTimeseriesRow::to_frame(&gold.timeseries)?;
        written.push(self.write_dataset(
            Layer::Gold,
            root,
            Dataset::CountryRateTimeseries,
            &mut timeseries,
        )?);

        let (written, counts) = with_counts(written);
        Ok(((written, gold.unmatched), counts))
    }

    fn write_dataset(
        &self,
        layer: Layer,
        root: &Path,
        dataset: Dataset,
        frame: &mut DataFrame,
    ) -> Result<LayerWriteSummary, StageError> {
        let partition_cols: &[String] = if dataset.is_country_keyed() {
            &self.options.partition_cols
        } else {
            &[]
        };
        let spec = LayerSpec::new(dataset.path_in(root), dataset.file_stem(layer))
            .partitioned_by(partition_cols)
            .overwrite(self.options.overwrite);
        let summary = self.writer.write(frame, &spec)?;
        debug!(
            layer = %layer,
            dataset = %dataset,
            rows = summary.rows,
            files = summary.files,
            partitions = summary.partitions.len(),
            "dataset stored"
        );
        Ok(summary)
    }
}

fn with_counts(written: Vec<LayerWriteSummary>) -> (Vec<LayerWriteSummary>, StageCounts) {
    let mut counts = StageCounts::default();
    for summary in &written {
        counts.add(summary.rows, summary.columns);
    }
    (written, counts)
}
