//! # Input Validation Module
//!
//! Checks a loaded sample table and its constants before the balance runs.
//! Each check reports the offending sheet rows so an external tool can
//! highlight the cells; the balance itself never needs these checks to
//! pass, since bad cells simply become undefined values.
//!
//! ## Validation Checklist
//!
//! 1. **Required columns**: every raw input column is present (failure)
//! 2. **Numeric cells**: gas readings and pressures are numbers; an empty
//!    pressure at the first row is allowed (failure)
//! 3. **Flush values**: 0 or 1 only (warning)
//! 4. **Composition**: the four gas readings do not sum to zero (warning)
//! 5. **Timestamps**: date/time cells parse (warning)
//! 6. **Time order**: elapsed time never decreases (warning)
//! 7. **GC method**: `LM`, `HM` or `VHM` when the column is present (warning)
//! 8. **Sample weight**: every flushed row carries a numeric weight when
//!    the weight column is present (warning)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use carbon_balance::table::{read_table_file, TableRegion};
//! use carbon_balance::validator::{validate_sample_table, ValidationOptions};
//!
//! let table = read_table_file("incubation.csv", &TableRegion::new(3, 0)).unwrap();
//! let report = validate_sample_table(&table, &ValidationOptions::for_header_row(3));
//! println!("{}", report);
//! for (column, rows) in report.invalid_rows() {
//!     println!("{}: {:?}", column, rows);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{RawConstants, FIELD_NAMES};
use crate::table::ColumnTable;

pub use report::{CheckStatus, CheckTally, ValidationCheck, ValidationReport};

mod input;
mod report;

/// Settings for [`validate_sample_table`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Added to every reported row index
    pub row_offset: usize,
    /// Read ambiguous dates as day/month/year
    pub day_first: bool,
}

impl ValidationOptions {
    /// Report 1-based sheet rows for a table whose header is on 0-based
    /// record `header_row`
    pub fn for_header_row(header_row: usize) -> Self {
        Self {
            row_offset: header_row + 2,
            day_first: false,
        }
    }
}

/// Run every input check over `table`
pub fn validate_sample_table(table: &ColumnTable, options: &ValidationOptions) -> ValidationReport {
    let mut report = ValidationReport::new("sample table");

    report.add_check(input::check_required_columns(table));
    report.extend(input::check_numeric_columns(table, options));
    report.extend(input::check_flush_values(table, options));
    report.extend(input::check_composition_sum(table, options));
    report.extend(input::check_timestamps(table, options));
    report.extend(input::check_time_order(table, options));
    report.extend(input::check_gc_method(table, options));
    report.extend(input::check_weight_when_flushed(table, options));

    report
}

/// One check per constant field
pub fn validate_constants(raw: &RawConstants) -> Vec<ValidationCheck> {
    let errors = match raw.validate() {
        Ok(_) => Vec::new(),
        Err(e) => e.errors,
    };

    FIELD_NAMES
        .iter()
        .map(|&field| {
            let name = format!("Constant '{}'", field);
            match errors.iter().find(|e| e.field == field) {
                Some(e) => ValidationCheck::failed(name, e.kind.to_string()),
                None => ValidationCheck::ok(name),
            }
        })
        .collect()
}
