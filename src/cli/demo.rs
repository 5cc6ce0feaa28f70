use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use carbon_balance::config::{Config, InputConfig, OutputConfig};
use carbon_balance::constants::{ConstantsRecord, RawConstants};
use carbon_balance::table::{write_table, Anchor, SampleRow, SampleSeries};

const DEMO_CSV: &str = "demo_incubation.csv";
const DEMO_CONFIG: &str = "carbon-balance.toml";
const NOTE_LINES: usize = 2;

/// Write a demo measurement sheet and its config
pub fn run(output_dir: PathBuf) -> Result<()> {
    info!("carbon-balance - Incubation Demo");
    info!("================================");

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let series = generate_demo_series();
    info!("Generated {} sampling events", series.len());

    let csv_path = output_dir.join(DEMO_CSV);
    write_demo_sheet(&csv_path, &series)?;

    let config_path = output_dir.join(DEMO_CONFIG);
    let config = demo_config();
    let toml = config.to_toml().context("Failed to render demo config")?;
    std::fs::write(&config_path, toml).with_context(|| format!("Failed to write {}", config_path.display()))?;

    info!("Demo complete!");
    println!("Wrote {} and {}", csv_path.display(), config_path.display());
    println!(
        "Run: carbon-balance process {} --config {}",
        csv_path.display(),
        config_path.display()
    );

    Ok(())
}

/// Sheet with a short notes block above the table
fn write_demo_sheet(path: &Path, series: &SampleSeries) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "Incubation demo,bottle 1,20 degC")?;
    writeln!(writer, "Readings in % and hPa,,")?;
    let table = series.to_table().context("Failed to lay out demo table")?;
    write_table(&mut writer, &table, Anchor::default()).context("Failed to write demo table")?;
    writer.flush()?;
    Ok(())
}

fn demo_config() -> Config {
    Config {
        constants: RawConstants::from(&ConstantsRecord::default()),
        input: InputConfig {
            header_row: Some(NOTE_LINES),
            first_column: Some("A".to_string()),
            last_column: None,
        },
        output: OutputConfig {
            anchor_row: Some(0),
            anchor_column: Some("A".to_string()),
        },
        ..Default::default()
    }
}

/// Twelve sampling events over three weeks, flushed every fourth event
fn generate_demo_series() -> SampleSeries {
    let start = NaiveDate::from_ymd_opt(2023, 4, 17).unwrap_or_default();
    let mut rows = Vec::new();
    let mut closed_steps = 0.0;

    for i in 0..12 {
        let flushed = i > 0 && i % 4 == 0;
        if flushed {
            closed_steps = 0.0;
        }

        let co2 = 0.03 + 0.85 * closed_steps;
        let o2 = 21.90 - 0.95 * closed_steps;
        let ch4 = 0.02 * closed_steps;
        // The GC rarely sums to exactly 100 %
        let n2 = 78.07 + 0.15 * ((i % 3) as f64 - 1.0);
        let pressure_before = if i == 0 { f64::NAN } else { 1013.0 - 2.5 * closed_steps };
        let pressure_after = 1005.0 - 2.5 * closed_steps;

        let date = start + Duration::days(2 * i as i64);
        let mut row = SampleRow::new(ch4, co2, o2, n2, pressure_before, pressure_after)
            .at(date.format("%Y-%m-%d").to_string(), "09:30:00");
        if flushed {
            row = row.flushed();
        }
        rows.push(row);

        closed_steps += 1.0;
    }

    SampleSeries::new(rows)
}
