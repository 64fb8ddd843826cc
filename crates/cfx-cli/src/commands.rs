use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use cfx_cli::config::PipelineConfig;
use cfx_cli::pipeline::{Pipeline, RunReport};
use cfx_extract::{
    Extractor, JsonFileExtractor, RatesRequest, RestCountriesExtractor, TimeseriesRatesExtractor,
};
use cfx_layer::{LayerManifest, read_layer, read_manifest};
use cfx_model::{COUNTRY_RAW_FIELDS, RATE_RAW_FIELDS, RatesWindow, format_date};

use crate::cli::{InspectArgs, RunArgs};

pub fn run_pipeline(args: &RunArgs) -> Result<RunReport> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    apply_overrides(&mut config, args);

    let today = Local::now().date_naive();
    let options = config.options(today)?;
    info!(
        bronze = %options.bronze_dir.display(),
        silver = %options.silver_dir.display(),
        gold = %options.gold_dir.display(),
        window_start = %format_date(options.window.start()),
        window_end = %format_date(options.window.end()),
        compression = %options.compression,
        "starting run"
    );

    let countries = countries_extractor(&config);
    let rates = rates_extractor(&config, options.window, &options.base);
    let report = Pipeline::new(options, countries, rates).run()?;
    Ok(report)
}

pub struct Inspection {
    pub rows: usize,
    pub columns: Vec<String>,
    pub manifest: LayerManifest,
}

pub fn run_inspect(args: &InspectArgs) -> Result<Inspection> {
    let manifest = read_manifest(&args.layer_dir)
        .with_context(|| format!("read manifest of {}", args.layer_dir.display()))?;
    let frame = read_layer(&args.layer_dir)
        .with_context(|| format!("read layer {}", args.layer_dir.display()))?;
    let columns = frame
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    Ok(Inspection {
        rows: frame.height(),
        columns,
        manifest,
    })
}

/// Layer CLI flags over the loaded config. Boolean flags can only switch a
/// setting on.
fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(dir) = &args.bronze_dir {
        config.bronze_dir.clone_from(dir);
    }
    if let Some(dir) = &args.silver_dir {
        config.silver_dir.clone_from(dir);
    }
    if let Some(dir) = &args.gold_dir {
        config.gold_dir.clone_from(dir);
    }
    if let Some(columns) = &args.partition_cols {
        config.partition_cols.clone_from(columns);
    }
    config.overwrite |= args.overwrite;
    config.skip_gold |= args.skip_gold;
    if let Some(date) = args.start_date {
        config.start_date = Some(format_date(date));
    }
    if let Some(date) = args.end_date {
        config.end_date = Some(format_date(date));
    }
    if let Some(symbols) = &args.symbols {
        config.symbols.clone_from(symbols);
    }
    if let Some(base) = &args.base {
        config.base.clone_from(base);
    }
    if let Some(path) = &args.countries_file {
        config.countries_file = Some(path.clone());
    }
    if let Some(path) = &args.rates_file {
        config.rates_file = Some(path.clone());
    }
    if let Some(compression) = args.compression {
        config.compression = compression;
    }
    if let Some(secs) = args.http_timeout_secs {
        config.http_timeout_secs = secs;
    }
}

fn countries_extractor(config: &PipelineConfig) -> Box<dyn Extractor> {
    match &config.countries_file {
        Some(path) => Box::new(JsonFileExtractor::new("countries", path, COUNTRY_RAW_FIELDS)),
        None => Box::new(
            RestCountriesExtractor::new()
                .with_url(config.countries_url.as_str())
                .with_timeout(config.http_timeout()),
        ),
    }
}

fn rates_extractor(config: &PipelineConfig, window: RatesWindow, base: &str) -> Box<dyn Extractor> {
    match &config.rates_file {
        Some(path) => Box::new(JsonFileExtractor::new("exchange_rates", path, RATE_RAW_FIELDS)),
        None => {
            let mut request = RatesRequest::new(window);
            request.symbols.clone_from(&config.symbols);
            request.base = base.to_string();
            request.timeout = config.http_timeout();
            Box::new(
                TimeseriesRatesExtractor::new(request).with_base_url(config.rates_url.as_str()),
            )
        }
    }
}
