//! # carbon-balance - Flush-Aware Carbon and Oxygen Balances for Incubations
//!
//! `carbon_balance` turns the gas-chromatograph and pressure readings of a
//! sealed incubation into cumulative carbon and oxygen balances for the
//! headspace and the liquid phase, normalised per gram of dry sample.
//!
//! ## Key Features
//!
//! - **Flush-Aware Accumulation**: a step whose headspace was exchanged with
//!   atmosphere is excluded; the next normal step builds on the last valid
//!   one, however far back it lies.
//!
//! - **Explicit Stage Pipeline**: pure stages read named columns and return
//!   new ones; the driver enforces their order and fails fast on missing
//!   inputs.
//!
//! - **Undefined Is a Value**: division by zero and missing readings flow
//!   through as `NaN` cells and are counted in the run report, never raised.
//!
//! - **Typed Constants**: physical constants are validated once into a
//!   statically typed record, reporting every bad field at once.
//!
//! ## Quick Start
//!
//! ```rust
//! use carbon_balance::prelude::*;
//!
//! let series = SampleSeries::new(vec![
//!     SampleRow::new(0.0, 0.03, 21.90, 78.07, 1013.0, 1005.0),
//!     SampleRow::new(0.1, 1.20, 20.30, 78.40, 1009.0, 1001.0),
//!     SampleRow::new(0.0, 0.04, 21.88, 78.08, 1013.0, 1004.0).flushed(),
//!     SampleRow::new(0.2, 1.05, 20.52, 78.23, 1010.0, 1002.0),
//! ]);
//!
//! let pipeline = Pipeline::new(ConstantsRecord::default(), PipelineOptions::default())?;
//! let (table, report) = pipeline.run_series(&series)?;
//!
//! let total = table.float(columns::TOTAL_CARBON_DRY_MATTER)?;
//! assert_eq!(total[0], 0.0);
//! assert!(total[2].is_nan(), "flushed step is undefined");
//! assert_eq!(report.rows, 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`table`]: named-column table, CSV region I/O, row model
//! - [`balance`]: the balance computations as pure slice functions
//! - [`pipeline`]: stage trait, standard stages, driver and run report
//! - [`constants`]: physical constants and their validation
//! - [`validator`]: input checks reporting offending sheet rows
//! - [`config`]: TOML run configuration
//! - [`columns`]: stable column names

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod balance;
pub mod columns;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod table;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::balance::{
        AqueousStrategy, FlushAnomaly, FlushAwareAccumulator, FlushMask, FlushPolicy, GasFractions,
    };
    pub use crate::columns;
    pub use crate::config::{Config, ConfigError};
    pub use crate::constants::{ConstantsError, ConstantsRecord, RawConstants};
    pub use crate::pipeline::{Pipeline, PipelineError, PipelineOptions, RunReport, Stage};
    pub use crate::table::{
        read_table, read_table_file, write_table, write_table_file, Anchor, ColumnData, ColumnTable,
        SampleRow, SampleSeries, TableError, TableRegion,
    };
    pub use crate::validator::{validate_constants, validate_sample_table, ValidationOptions, ValidationReport};
}
