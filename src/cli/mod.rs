use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use carbon_balance::balance::{AqueousStrategy, FlushPolicy};
use carbon_balance::config::{Config, InputConfig, OutputConfig};
use carbon_balance::table::{Anchor, TableRegion};

mod demo;
mod process;
mod validate;

/// carbon-balance - Flush-aware carbon and oxygen balances for incubations
#[derive(Parser)]
#[command(name = "carbon-balance")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where the table sits in the input file; overrides `[input]`
#[derive(Args, Debug, Default)]
pub struct RegionArgs {
    /// 0-based line of the header row
    #[arg(long, value_name = "N")]
    header_row: Option<usize>,

    /// Column letter of the first table column
    #[arg(long, value_name = "LETTERS")]
    first_column: Option<String>,

    /// Column letter of the last table column
    #[arg(long, value_name = "LETTERS")]
    last_column: Option<String>,
}

impl RegionArgs {
    fn resolve(&self, config: &InputConfig) -> Result<TableRegion> {
        let merged = InputConfig {
            header_row: self.header_row.or(config.header_row),
            first_column: self.first_column.clone().or_else(|| config.first_column.clone()),
            last_column: self.last_column.clone().or_else(|| config.last_column.clone()),
        };
        merged.region().context("Invalid input region")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the balance over a measurement CSV and write the extended table
    Process {
        /// Input CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Load constants and settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output CSV file (defaults to <INPUT>_processed.csv)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Write the run report as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        #[command(flatten)]
        region: RegionArgs,

        /// 0-based line of the written header row
        #[arg(long, value_name = "N")]
        anchor_row: Option<usize>,

        /// Column letter of the first written column
        #[arg(long, value_name = "LETTERS")]
        anchor_column: Option<String>,

        /// Handling of flush values other than 0 and 1
        /// (treat-as-flushed, treat-as-normal, reject)
        #[arg(long)]
        flush_policy: Option<FlushPolicy>,

        /// Accumulation of dissolved CO2 (flush-aware, running-sum)
        #[arg(long)]
        aqueous_strategy: Option<AqueousStrategy>,

        /// Row-0 value of seeded columns
        #[arg(long, value_name = "VALUE", allow_hyphen_values = true)]
        first_row_value: Option<f64>,
    },

    /// Check a measurement CSV (and its constants) before processing
    Validate {
        /// Input CSV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Also check the constants in this TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        region: RegionArgs,
    },

    /// Write a demo measurement CSV and a matching config file
    Demo {
        /// Directory to write into
        #[arg(value_name = "OUTPUT_DIR", default_value = ".")]
        output_dir: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Config from file, or all defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn resolve_anchor(row: Option<usize>, column: Option<String>, config: &OutputConfig) -> Result<Anchor> {
    let merged = OutputConfig {
        anchor_row: row.or(config.anchor_row),
        anchor_column: column.or_else(|| config.anchor_column.clone()),
    };
    merged.anchor().context("Invalid output anchor")
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process {
            input,
            config,
            output,
            report,
            region,
            anchor_row,
            anchor_column,
            flush_policy,
            aqueous_strategy,
            first_row_value,
        } => {
            let config = load_config(config.as_deref())?;
            let region = region.resolve(&config.input)?;
            let anchor = resolve_anchor(anchor_row, anchor_column, &config.output)?;

            let mut options = config.pipeline.clone();
            if let Some(policy) = flush_policy {
                options.flush_policy = policy;
            }
            if let Some(strategy) = aqueous_strategy {
                options.aqueous_strategy = strategy;
            }
            if let Some(seed) = first_row_value {
                options.first_row_value = seed;
            }

            process::run(process::ProcessJob {
                input,
                output,
                report,
                region,
                anchor,
                constants: config.constants,
                options,
            })
        }
        Commands::Validate { input, config, region } => {
            let loaded = load_config(config.as_deref())?;
            let region = region.resolve(&loaded.input)?;
            let constants = config.map(|_| loaded.constants);
            validate::run(input, region, loaded.pipeline.day_first, constants)
        }
        Commands::Demo { output_dir } => demo::run(output_dir),
    }
}
