//! # carbon-balance
//!
//! A command-line tool for computing flush-aware carbon and oxygen balances
//! from incubation measurement sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Write a demo sheet and config
//! carbon-balance demo ./demo
//!
//! # Check a sheet before processing
//! carbon-balance validate demo/demo_incubation.csv --config demo/carbon-balance.toml
//!
//! # Run the balance and write the extended table
//! carbon-balance process demo/demo_incubation.csv --config demo/carbon-balance.toml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
