//! # Physical constants of one incubation
//!
//! Constants arrive as loosely typed configuration values ([`RawConstants`])
//! and are validated once into a [`ConstantsRecord`] whose fields are plain
//! `f64`. Validation reports every bad field at once.
//!
//! ```toml
//! [constants]
//! gas_constant = 8.314        # J/(mol K)
//! temperature = 293.15        # K
//! headspace_volume = 0.00055  # m3
//! water_volume = 0.1          # L
//! dry_mass_sample = 25.0      # g
//! molar_mass_carbon = 12.0    # g/mol (default 12)
//! henry_constant_co2 = 5.23e-3  # mol/(m3 Pa) (default: 20 °C)
//! ```

use serde::{Deserialize, Serialize};

use crate::balance::aqueous::HENRY_CO2_20C;

/// Molar mass of carbon used when none is configured [g/mol]
pub const MOLAR_MASS_CARBON: f64 = 12.0;

/// Configuration names of every constant, in declaration order
pub const FIELD_NAMES: [&str; 7] = [
    "gas_constant",
    "temperature",
    "headspace_volume",
    "water_volume",
    "dry_mass_sample",
    "molar_mass_carbon",
    "henry_constant_co2",
];

/// Validated, immutable constants for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantsRecord {
    /// Universal gas constant [J/(mol K)]
    pub gas_constant: f64,
    /// Incubation temperature [K]
    pub temperature: f64,
    /// Headspace volume [m3]
    pub headspace_volume: f64,
    /// Water volume in the vessel [L]
    pub water_volume: f64,
    /// Dry mass of the sample [g]
    pub dry_mass_sample: f64,
    /// Molar mass of carbon [g/mol]
    pub molar_mass_carbon: f64,
    /// Henry's-law constant for CO2 [mol/(m3 Pa)]
    pub henry_constant_co2: f64,
}

impl Default for ConstantsRecord {
    /// A 1 L bottle at 20 °C holding 25 g dry sample in 0.1 L water
    fn default() -> Self {
        Self {
            gas_constant: 8.314,
            temperature: 293.15,
            headspace_volume: 0.00055,
            water_volume: 0.1,
            dry_mass_sample: 25.0,
            molar_mass_carbon: MOLAR_MASS_CARBON,
            henry_constant_co2: HENRY_CO2_20C,
        }
    }
}

impl ConstantsRecord {
    /// Factor turning cumulative moles of carbon into mg C per g dry matter
    pub fn dry_mass_factor(&self) -> f64 {
        self.molar_mass_carbon * 1000.0 / self.dry_mass_sample
    }

    /// Check the ranges of an already typed record
    pub fn check(&self) -> Result<(), ConstantsError> {
        let mut errors = Vec::new();
        for (field, value) in self.fields() {
            if let Err(kind) = check_range(field, value) {
                errors.push(ConstantError { field, kind });
            }
        }
        ConstantsError::from_list(errors)
    }

    fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("gas_constant", self.gas_constant),
            ("temperature", self.temperature),
            ("headspace_volume", self.headspace_volume),
            ("water_volume", self.water_volume),
            ("dry_mass_sample", self.dry_mass_sample),
            ("molar_mass_carbon", self.molar_mass_carbon),
            ("henry_constant_co2", self.henry_constant_co2),
        ]
    }
}

/// Why a single constant was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstantErrorKind {
    /// No value given
    #[error("is not set")]
    Unset,
    /// Value is not a number
    #[error("is not numeric (found {0})")]
    NotNumeric(String),
    /// Value is NaN or infinite
    #[error("is not finite")]
    NonFinite,
    /// Value is outside its physical range
    #[error("must be {expected} (found {value})")]
    OutOfRange {
        /// Offending value
        value: f64,
        /// Human-readable bound
        expected: &'static str,
    },
}

/// A rejected constant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {kind}")]
pub struct ConstantError {
    /// Field name as used in the configuration
    pub field: &'static str,
    /// Reason
    pub kind: ConstantErrorKind,
}

/// All rejected constants of one record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid constants: {}", join_errors(.errors))]
pub struct ConstantsError {
    /// Field-level errors in declaration order (never empty)
    pub errors: Vec<ConstantError>,
}

impl ConstantsError {
    fn from_list(errors: Vec<ConstantError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self { errors })
        }
    }
}

fn join_errors(errors: &[ConstantError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

fn check_range(field: &str, value: f64) -> Result<(), ConstantErrorKind> {
    if !value.is_finite() {
        return Err(ConstantErrorKind::NonFinite);
    }
    // An incubation without a liquid phase is legitimate
    if field == "water_volume" {
        if value < 0.0 {
            return Err(ConstantErrorKind::OutOfRange {
                value,
                expected: "zero or greater",
            });
        }
    } else if value <= 0.0 {
        return Err(ConstantErrorKind::OutOfRange {
            value,
            expected: "greater than zero",
        });
    }
    Ok(())
}

/// Constants as read from configuration, before validation.
///
/// Field names follow [`ConstantsRecord`]; the names used by the original
/// measurement sheets (`Rgas`, `expTemp`, `volume_headspace`,
/// `henryeff_20`) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConstants {
    /// Universal gas constant
    #[serde(default, alias = "Rgas")]
    pub gas_constant: Option<toml::Value>,
    /// Incubation temperature
    #[serde(default, alias = "expTemp")]
    pub temperature: Option<toml::Value>,
    /// Headspace volume
    #[serde(default, alias = "volume_headspace")]
    pub headspace_volume: Option<toml::Value>,
    /// Water volume
    #[serde(default)]
    pub water_volume: Option<toml::Value>,
    /// Sample dry mass
    #[serde(default)]
    pub dry_mass_sample: Option<toml::Value>,
    /// Molar mass of carbon (defaults to 12)
    #[serde(default)]
    pub molar_mass_carbon: Option<toml::Value>,
    /// Henry's-law constant for CO2 (defaults to the 20 °C value)
    #[serde(default, alias = "henryeff_20")]
    pub henry_constant_co2: Option<toml::Value>,
}

impl From<&ConstantsRecord> for RawConstants {
    fn from(c: &ConstantsRecord) -> Self {
        let v = |x: f64| Some(toml::Value::Float(x));
        Self {
            gas_constant: v(c.gas_constant),
            temperature: v(c.temperature),
            headspace_volume: v(c.headspace_volume),
            water_volume: v(c.water_volume),
            dry_mass_sample: v(c.dry_mass_sample),
            molar_mass_carbon: v(c.molar_mass_carbon),
            henry_constant_co2: v(c.henry_constant_co2),
        }
    }
}

impl RawConstants {
    /// Validate every field, collecting all errors
    pub fn validate(&self) -> Result<ConstantsRecord, ConstantsError> {
        let mut errors = Vec::new();
        let mut field = |name: &'static str, value: &Option<toml::Value>, default: Option<f64>| -> f64 {
            match numeric(value, default).and_then(|x| check_range(name, x).map(|_| x)) {
                Ok(x) => x,
                Err(kind) => {
                    errors.push(ConstantError { field: name, kind });
                    f64::NAN
                }
            }
        };

        let record = ConstantsRecord {
            gas_constant: field("gas_constant", &self.gas_constant, None),
            temperature: field("temperature", &self.temperature, None),
            headspace_volume: field("headspace_volume", &self.headspace_volume, None),
            water_volume: field("water_volume", &self.water_volume, None),
            dry_mass_sample: field("dry_mass_sample", &self.dry_mass_sample, None),
            molar_mass_carbon: field("molar_mass_carbon", &self.molar_mass_carbon, Some(MOLAR_MASS_CARBON)),
            henry_constant_co2: field("henry_constant_co2", &self.henry_constant_co2, Some(HENRY_CO2_20C)),
        };

        ConstantsError::from_list(errors)?;
        Ok(record)
    }
}

fn numeric(value: &Option<toml::Value>, default: Option<f64>) -> Result<f64, ConstantErrorKind> {
    match value {
        Some(toml::Value::Float(x)) => Ok(*x),
        Some(toml::Value::Integer(i)) => Ok(*i as f64),
        Some(other) => Err(ConstantErrorKind::NotNumeric(other.type_str().to_string())),
        None => default.ok_or(ConstantErrorKind::Unset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> RawConstants {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_validate_complete() {
        let raw = parse(
            r#"
            gas_constant = 8.314
            temperature = 293
            headspace_volume = 0.0005
            water_volume = 0.1
            dry_mass_sample = 20.0
        "#,
        );

        let c = raw.validate().unwrap();
        assert_eq!(c.temperature, 293.0);
        assert_eq!(c.molar_mass_carbon, 12.0);
        assert_eq!(c.henry_constant_co2, 5.23e-3);
        assert_eq!(c.dry_mass_factor(), 600.0);
    }

    #[test]
    fn test_sheet_aliases() {
        let raw = parse(
            r#"
            Rgas = 8.314
            expTemp = 298.0
            volume_headspace = 10
            water_volume = 0
            dry_mass_sample = 1
            henryeff_20 = 0.004
        "#,
        );

        let c = raw.validate().unwrap();
        assert_eq!(c.gas_constant, 8.314);
        assert_eq!(c.headspace_volume, 10.0);
        assert_eq!(c.henry_constant_co2, 0.004);
    }

    #[test]
    fn test_collects_every_error() {
        let raw = parse(
            r#"
            gas_constant = "eight"
            temperature = -3.0
            water_volume = 0.1
            dry_mass_sample = 0
        "#,
        );

        let err = raw.validate().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["gas_constant", "temperature", "headspace_volume", "dry_mass_sample"]);
        assert_eq!(err.errors[0].kind, ConstantErrorKind::NotNumeric("string".to_string()));
        assert_eq!(err.errors[2].kind, ConstantErrorKind::Unset);
        assert!(err.to_string().contains("headspace_volume is not set"));
    }

    #[test]
    fn test_error_message_lists_every_field() {
        let raw = parse(
            r#"
            gas_constant = 8.314
            temperature = 293.15
            water_volume = -1
            dry_mass_sample = 20
        "#,
        );

        let err = raw.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid constants: headspace_volume is not set; water_volume must be zero or greater (found -1)"
        );
    }

    #[test]
    fn test_check_typed_record() {
        assert!(ConstantsRecord::default().check().is_ok());

        let bad = ConstantsRecord {
            temperature: f64::NAN,
            ..ConstantsRecord::default()
        };
        let err = bad.check().unwrap_err();
        assert_eq!(err.errors[0].kind, ConstantErrorKind::NonFinite);
    }

    #[test]
    fn test_raw_from_record_validates() {
        let record = ConstantsRecord::default();
        assert_eq!(RawConstants::from(&record).validate().unwrap(), record);
    }
}
