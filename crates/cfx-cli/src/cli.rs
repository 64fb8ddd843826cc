//! CLI argument definitions for the country FX pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use cfx_layer::Compression;

#[derive(Parser)]
#[command(
    name = "cfx-etl",
    version,
    about = "Countries and FX rates batch ETL",
    long_about = "Extract country metadata and daily FX rates, normalize them, and write\n\
                  bronze, silver and gold Parquet layers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow sample row values in debug logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline: extract, normalize and write every layer.
    Run(RunArgs),

    /// Show the rows, columns and partitions of a written layer.
    Inspect(InspectArgs),
}

/// Flags of `run`. Unset flags fall back to the config file, then to the
/// built-in defaults.
#[derive(Parser)]
pub struct RunArgs {
    /// TOML file with pipeline settings.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bronze layer root (default: data/bronze).
    #[arg(long = "bronze-dir", value_name = "DIR")]
    pub bronze_dir: Option<PathBuf>,

    /// Silver layer root (default: data/silver).
    #[arg(long = "silver-dir", value_name = "DIR")]
    pub silver_dir: Option<PathBuf>,

    /// Gold layer root (default: data/gold).
    #[arg(long = "gold-dir", value_name = "DIR")]
    pub gold_dir: Option<PathBuf>,

    /// Partition columns for country datasets (default: region).
    ///
    /// Pass the flag with no value to disable partitioning.
    #[arg(
        long = "partition-cols",
        value_name = "COLUMN",
        num_args = 0..,
        value_delimiter = ','
    )]
    pub partition_cols: Option<Vec<String>>,

    /// Replace existing layers.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    /// Skip rates extraction and the gold layer.
    #[arg(long = "skip-gold")]
    pub skip_gold: bool,

    /// First day of the rates window (default: 9 days before the end date).
    #[arg(long = "start-date", value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,

    /// Last day of the rates window (default: today).
    #[arg(long = "end-date", value_name = "YYYY-MM-DD")]
    pub end_date: Option<NaiveDate>,

    /// Target currencies, comma separated (default: all).
    #[arg(long = "symbols", value_name = "CODES", value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Base currency of the rates (default: EUR).
    #[arg(long = "base", value_name = "CODE")]
    pub base: Option<String>,

    /// Read countries from a JSON file instead of the REST API.
    #[arg(long = "countries-file", value_name = "FILE")]
    pub countries_file: Option<PathBuf>,

    /// Read rates from a JSON file instead of the rates API.
    #[arg(long = "rates-file", value_name = "FILE")]
    pub rates_file: Option<PathBuf>,

    /// Parquet compression codec (snappy, zstd, gzip, lz4, none).
    #[arg(long = "compression", value_name = "CODEC")]
    pub compression: Option<Compression>,

    /// HTTP timeout in seconds (default: 30).
    #[arg(long = "http-timeout-secs", value_name = "SECS")]
    pub http_timeout_secs: Option<u64>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Layer directory, for example data/silver/countries.
    #[arg(value_name = "LAYER_DIR")]
    pub layer_dir: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let mut argv = vec!["cfx-etl", "run"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            Command::Inspect(_) => unreachable!("parsed a run command"),
        }
    }

    #[test]
    fn partition_flag_without_values_disables_partitioning() {
        assert_eq!(run_args(&["--partition-cols"]).partition_cols, Some(vec![]));
        assert_eq!(run_args(&[]).partition_cols, None);
        assert_eq!(
            run_args(&["--partition-cols", "region,subregion"]).partition_cols,
            Some(vec!["region".to_string(), "subregion".to_string()])
        );
    }

    #[test]
    fn dates_and_codecs_are_parsed() {
        let args = run_args(&[
            "--start-date",
            "2024-01-01",
            "--compression",
            "zstd",
            "--symbols",
            "USD,BRL",
        ]);
        assert_eq!(args.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.compression, Some(Compression::Zstd));
        assert_eq!(args.symbols, Some(vec!["USD".to_string(), "BRL".to_string()]));
    }

    #[test]
    fn malformed_date_is_rejected() {
        assert!(Cli::try_parse_from(["cfx-etl", "run", "--end-date", "31/01/2024"]).is_err());
    }
}
