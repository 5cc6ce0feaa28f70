//! # Pipeline driver
//!
//! Runs the balance stages over one sample table in a fixed order:
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | `elapsed-time` (optional) | Date, Time | Day |
//! | `composition` | raw CH4/CO2/O2/N2 | sums, corrected % |
//! | `molar` | pressures, corrected % | moles before/after |
//! | `gas-steps` | moles, flush | per-step O2/CO2/carbon |
//! | `gas-cumulative` | per-step, flush | cumulative, dry-matter carbon |
//! | `aqueous` | pressures, corrected CO2, flush | dissolved CO2, DIC |
//! | `results` | dry-matter carbon, DIC, steps, flush | total carbon, O2/CO2 |
//!
//! Before any stage runs, text cells in the numeric input columns are
//! coerced to numbers. Every stage's inputs are checked before it computes;
//! a missing one aborts the run with [`PipelineError::MissingColumn`]. The
//! flush column is resolved into a [`FlushMask`] the first time a stage
//! needs it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use carbon_balance::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut table = read_table_file("incubation.csv", &TableRegion::new(0, 0))?;
//! let pipeline = Pipeline::new(ConstantsRecord::default(), PipelineOptions::default())?;
//! let report = pipeline.run(&mut table)?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

mod error;
mod report;
pub mod stage;

#[cfg(test)]
mod tests;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::balance::{AqueousStrategy, FlushMask, FlushPolicy, GasFractions};
use crate::columns;
use crate::constants::{ConstantsRecord, RawConstants};
use crate::table::{ColumnData, ColumnTable, SampleSeries};

pub use error::PipelineError;
pub use report::{RunReport, StageSummary};
pub use stage::{standard_stages, Stage, StageContext, StageOutput};

/// Run options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Row-0 value of every seeded column
    pub first_row_value: f64,
    /// Handling of flush values other than 0 and 1
    pub flush_policy: FlushPolicy,
    /// Accumulation of dissolved CO2
    pub aqueous_strategy: AqueousStrategy,
    /// Read ambiguous dates as day/month/year
    pub day_first: bool,
    /// Replace the row-0 raw composition before normalising
    pub baseline_composition: Option<GasFractions>,
}

/// Ordered stages plus the constants and options they run with
pub struct Pipeline {
    constants: ConstantsRecord,
    options: PipelineOptions,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Pipeline with the standard stages. Fails if a constant is out of range.
    pub fn new(constants: ConstantsRecord, options: PipelineOptions) -> Result<Self, PipelineError> {
        constants.check()?;
        Ok(Self {
            constants,
            options,
            stages: standard_stages(),
        })
    }

    /// Validate raw configuration constants and build the pipeline
    pub fn from_raw(constants: &RawConstants, options: PipelineOptions) -> Result<Self, PipelineError> {
        Self::new(constants.validate()?, options)
    }

    /// Replace the stage list
    pub fn with_stages(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages = stages;
        self
    }

    /// Constants in use
    pub fn constants(&self) -> &ConstantsRecord {
        &self.constants
    }

    /// Options in use
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Build the input table from `series` and run over it
    pub fn run_series(&self, series: &SampleSeries) -> Result<(ColumnTable, RunReport), PipelineError> {
        let mut table = series.to_table()?;
        let report = self.run(&mut table)?;
        Ok((table, report))
    }

    /// Run every stage over `table`, appending (or replacing) its output
    /// columns.
    ///
    /// On error the table may already hold the columns of earlier stages.
    pub fn run(&self, table: &mut ColumnTable) -> Result<RunReport, PipelineError> {
        info!("Running {} stage(s) over {} row(s)", self.stages.len(), table.row_count());

        let mut report = RunReport {
            rows: table.row_count(),
            ..Default::default()
        };

        for &name in columns::NUMERIC_INPUTS {
            if !table.contains(name) {
                continue;
            }
            let invalid = table.coerce_float(name)?;
            if !invalid.is_empty() {
                warn!("{} unparsable cell(s) in '{}' read as undefined", invalid.len(), name);
                report.unparsable_inputs.insert(name.to_string(), invalid);
            }
        }

        let empty = FlushMask::default();
        let mut mask: Option<FlushMask> = None;

        for stage in &self.stages {
            let name = stage.name();

            if let Some(missing) = stage.inputs().iter().find(|c| !table.contains(c)) {
                if stage.optional() {
                    info!("Skipping stage '{}': column '{}' not present", name, missing);
                    report.stages.push(StageSummary {
                        name: name.to_string(),
                        columns: Vec::new(),
                        skipped: true,
                    });
                    continue;
                }
                return Err(PipelineError::MissingColumn {
                    stage: name,
                    column: missing.to_string(),
                });
            }

            if stage.uses_flush() && mask.is_none() {
                let flush = table
                    .float(columns::FLUSH)
                    .map_err(|e| PipelineError::from_table(name, e))?;
                let resolved = FlushMask::resolve(flush, self.options.flush_policy)?;
                report.flush_anomalies = resolved.anomalies().to_vec();
                mask = Some(resolved);
            }

            debug!("Running stage '{}'", name);
            let output = {
                let ctx = StageContext::new(name, table, &self.constants, &self.options, mask.as_ref().unwrap_or(&empty));
                stage.compute(&ctx)?
            };

            let mut written = Vec::with_capacity(output.len());
            for (column, values) in output {
                table.set_column(column, ColumnData::Float(values))?;
                written.push(column.to_string());
            }
            debug!("Stage '{}' wrote {} column(s)", name, written.len());

            report.stages.push(StageSummary {
                name: name.to_string(),
                columns: written,
                skipped: false,
            });
        }

        let mut indeterminate = std::collections::BTreeMap::new();
        for column in report.written_columns() {
            let count = table.nan_count(column)?;
            if count > 0 {
                indeterminate.insert(column.to_string(), count);
            }
        }
        report.indeterminate = indeterminate;

        info!("Pipeline finished: {} column(s) written", report.written_columns().count());
        Ok(report)
    }
}
