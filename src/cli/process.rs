use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use carbon_balance::constants::RawConstants;
use carbon_balance::pipeline::{Pipeline, PipelineOptions};
use carbon_balance::table::{read_table_file, write_table_file, Anchor, TableRegion};

/// Everything `process` needs after flags and config are merged
pub struct ProcessJob {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub region: TableRegion,
    pub anchor: Anchor,
    pub constants: RawConstants,
    pub options: PipelineOptions,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_processed.csv", stem))
}

/// Run the balance over one CSV file
pub fn run(job: ProcessJob) -> Result<()> {
    let pipeline = Pipeline::from_raw(&job.constants, job.options).context("Cannot build pipeline")?;
    info!("Constants: {:?}", pipeline.constants());

    info!("Reading {}", job.input.display());
    let mut table = read_table_file(&job.input, &job.region)
        .with_context(|| format!("Failed to read table from {}", job.input.display()))?;
    info!("  {} rows, {} columns", table.row_count(), table.column_count());

    let report = pipeline
        .run(&mut table)
        .with_context(|| format!("Balance failed for {}", job.input.display()))?;

    let output = job.output.unwrap_or_else(|| default_output(&job.input));
    write_table_file(&output, &table, job.anchor)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote {} columns to {}", table.column_count(), output.display());

    println!("{}", report);

    if let Some(path) = job.report {
        let json = report.to_json().context("Failed to serialize run report")?;
        std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        assert_eq!(
            default_output(Path::new("data/bottle_3.csv")),
            PathBuf::from("data/bottle_3_processed.csv")
        );
    }
}
