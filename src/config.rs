//! TOML run configuration.
//!
//! One file describes a sample: its constants, how the balance runs, where
//! the table sits in the input sheet and where results are written.
//!
//! ```toml
//! # carbon-balance.toml
//! [constants]
//! gas_constant = 8.314
//! temperature = 293.15
//! headspace_volume = 0.00055
//! water_volume = 0.1
//! dry_mass_sample = 25.0
//!
//! [pipeline]
//! first_row_value = 0.0
//! flush_policy = "treat-as-flushed"
//! aqueous_strategy = "flush-aware"
//! day_first = true
//!
//! [pipeline.baseline_composition]
//! ch4 = 0.0
//! co2 = 0.03
//! o2 = 21.90
//! n2 = 78.07
//!
//! [input]
//! header_row = 3
//! first_column = "A"
//! last_column = "I"
//!
//! [output]
//! anchor_row = 0
//! anchor_column = "A"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::RawConstants;
use crate::pipeline::PipelineOptions;
use crate::table::{column_index, Anchor, TableError, TableRegion};

/// Errors loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Physical constants, validated when the pipeline is built
    #[serde(default)]
    pub constants: RawConstants,

    /// Balance options
    #[serde(default)]
    pub pipeline: PipelineOptions,

    /// Table location in the input file
    #[serde(default)]
    pub input: InputConfig,

    /// Table location in the output file
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the table sits in the input file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// 0-based record of the header row.
    pub header_row: Option<usize>,

    /// Column letter of the first table column.
    pub first_column: Option<String>,

    /// Column letter of the last table column (inclusive).
    pub last_column: Option<String>,
}

impl InputConfig {
    /// Region to load; unset fields start at `A1` and read to the last header
    pub fn region(&self) -> Result<TableRegion, TableError> {
        let mut region = TableRegion::new(
            self.header_row.unwrap_or(0),
            self.first_column.as_deref().map(column_index).transpose()?.unwrap_or(0),
        );
        if let Some(last) = self.last_column.as_deref() {
            region = region.with_last_column(column_index(last)?);
        }
        Ok(region)
    }
}

/// Where results are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 0-based record of the written header row.
    pub anchor_row: Option<usize>,

    /// Column letter of the first written column.
    pub anchor_column: Option<String>,
}

impl OutputConfig {
    /// Anchor cell; unset fields default to `A1`
    pub fn anchor(&self) -> Result<Anchor, TableError> {
        Ok(Anchor {
            row: self.anchor_row.unwrap_or(0),
            column: self.anchor_column.as_deref().map(column_index).transpose()?.unwrap_or(0),
        })
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
