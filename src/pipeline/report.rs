use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::balance::FlushAnomaly;

/// What one stage did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    /// Stage name
    pub name: String,
    /// Columns written, in order
    pub columns: Vec<String>,
    /// Set when an optional stage lacked its inputs
    pub skipped: bool,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of rows processed
    pub rows: usize,
    /// Stages in execution order
    pub stages: Vec<StageSummary>,
    /// Flush cells that were neither 0 nor 1
    pub flush_anomalies: Vec<FlushAnomaly>,
    /// Text cells in numeric input columns that could not be parsed, by column
    pub unparsable_inputs: BTreeMap<String, Vec<usize>>,
    /// Undefined cells per written column (columns without any are omitted)
    pub indeterminate: BTreeMap<String, usize>,
}

impl RunReport {
    /// All columns written by the run, in order
    pub fn written_columns(&self) -> impl Iterator<Item = &str> {
        self.stages
            .iter()
            .flat_map(|s| s.columns.iter().map(String::as_str))
    }

    /// Undefined cells in one written column
    pub fn indeterminate_count(&self, column: &str) -> usize {
        self.indeterminate.get(column).copied().unwrap_or(0)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed {} rows", self.rows)?;
        for stage in &self.stages {
            if stage.skipped {
                writeln!(f, "  {:<16} skipped", stage.name)?;
            } else {
                writeln!(f, "  {:<16} {} column(s)", stage.name, stage.columns.len())?;
            }
        }

        if !self.flush_anomalies.is_empty() {
            let rows: Vec<String> = self.flush_anomalies.iter().map(|a| a.row.to_string()).collect();
            writeln!(f, "Flush anomalies at rows: {}", rows.join(", "))?;
        }
        for (column, rows) in &self.unparsable_inputs {
            writeln!(f, "Unparsable cells in '{}': {} row(s)", column, rows.len())?;
        }
        if !self.indeterminate.is_empty() {
            writeln!(f, "Undefined cells:")?;
            for (column, count) in &self.indeterminate {
                writeln!(f, "  {}: {}", column, count)?;
            }
        }
        Ok(())
    }
}
