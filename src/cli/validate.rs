use anyhow::Result;
use log::info;
use std::path::PathBuf;

use carbon_balance::constants::RawConstants;
use carbon_balance::table::{read_table_file, TableRegion};
use carbon_balance::validator::{validate_constants, validate_sample_table, ValidationOptions};

/// Validate a measurement CSV and, when given, its constants
pub fn run(input: PathBuf, region: TableRegion, day_first: bool, constants: Option<RawConstants>) -> Result<()> {
    info!("Input Validator");
    info!("===============");
    info!("File: {}", input.display());
    info!("");

    let table = match read_table_file(&input, &region) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Validation error: {}", e);
            std::process::exit(1);
        }
    };

    let options = ValidationOptions {
        day_first,
        ..ValidationOptions::for_header_row(region.header_row)
    };
    let mut report = validate_sample_table(&table, &options);
    report.source = input.display().to_string();
    if let Some(raw) = constants {
        report.extend(validate_constants(&raw));
    }

    println!("{}", report.format_colored());

    let tally = report.tally();
    info!(
        "{} checks passed, {} warned, {} failed",
        tally.passed, tally.warned, tally.failed
    );

    // Exit with error code if validation failed
    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
