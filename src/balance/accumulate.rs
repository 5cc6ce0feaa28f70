//! # Flush-aware accumulation
//!
//! A flush replaces the headspace with atmosphere, so the step that
//! contains it says nothing about biological activity. Cumulative series
//! therefore skip flushed rows: a flushed row is undefined, and the next
//! normal row builds on the most recent *earlier* normal row, which may be
//! several rows back.
//!
//! ```text
//! Δ = [0, 2, NaN, 4, NaN]
//! F = [0, 0, 1,   0, 1  ]
//! C = [0, 2, NaN, 6, NaN]     row 3 = C[1] + 4
//! ```
//!
//! The fold must run in ascending row order; which prior row counts is
//! only known by replaying it from row 0.

use log::warn;
use serde::{Deserialize, Serialize};

/// Flush indicator value for a normal step
pub const NOT_FLUSHED: f64 = 0.0;
/// Flush indicator value for a step whose headspace was exchanged
pub const FLUSHED: f64 = 1.0;

/// How flush values other than 0 and 1 are handled.
///
/// Such values are always reported as [`FlushAnomaly`]s; the policy only
/// decides how the row is treated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushPolicy {
    /// Treat the row as flushed: undefined cumulative, never a base row
    #[default]
    TreatAsFlushed,
    /// Treat the row as a normal step
    TreatAsNormal,
    /// Abort the run
    Reject,
}

impl FlushPolicy {
    /// Accepted names for configuration and CLI input
    pub fn variants() -> &'static [&'static str] {
        &["treat-as-flushed", "treat-as-normal", "reject"]
    }
}

impl std::str::FromStr for FlushPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "treat-as-flushed" | "flushed" => Ok(FlushPolicy::TreatAsFlushed),
            "treat-as-normal" | "normal" => Ok(FlushPolicy::TreatAsNormal),
            "reject" => Ok(FlushPolicy::Reject),
            _ => Err(format!(
                "Unknown flush policy '{}'. Valid options: {}",
                s,
                FlushPolicy::variants().join(", ")
            )),
        }
    }
}

/// A flush cell holding something other than 0 or 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlushAnomaly {
    /// Row index
    pub row: usize,
    /// Value found (`None` for an empty cell)
    pub value: Option<f64>,
}

impl std::fmt::Display for FlushAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(value) => write!(f, "row {} ({})", self.row, value),
            None => write!(f, "row {} (empty)", self.row),
        }
    }
}

/// Error raised when the policy is [`FlushPolicy::Reject`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error(
    "Flush indicator must be 0 or 1; found {} invalid value(s){}",
    .anomalies.len(),
    first_anomaly(.anomalies)
)]
pub struct FlushIntegrityError {
    /// Every offending cell, in row order (never empty)
    pub anomalies: Vec<FlushAnomaly>,
}

fn first_anomaly(anomalies: &[FlushAnomaly]) -> String {
    anomalies
        .first()
        .map(|a| format!(", first at {}", a))
        .unwrap_or_default()
}

/// Per-row flushed/normal decision after applying a [`FlushPolicy`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushMask {
    flushed: Vec<bool>,
    anomalies: Vec<FlushAnomaly>,
}

impl FlushMask {
    /// Resolve a raw flush column. Anomalies are logged at `warn` level.
    pub fn resolve(values: &[f64], policy: FlushPolicy) -> Result<Self, FlushIntegrityError> {
        let mut anomalies = Vec::new();
        let flushed = values
            .iter()
            .enumerate()
            .map(|(row, &value)| {
                if value == FLUSHED {
                    true
                } else if value == NOT_FLUSHED {
                    false
                } else {
                    warn!("Unknown value for flush at row {}: {} (must be 0 or 1)", row, value);
                    anomalies.push(FlushAnomaly {
                        row,
                        value: (!value.is_nan()).then_some(value),
                    });
                    policy != FlushPolicy::TreatAsNormal
                }
            })
            .collect();

        if policy == FlushPolicy::Reject && !anomalies.is_empty() {
            return Err(FlushIntegrityError { anomalies });
        }

        Ok(Self { flushed, anomalies })
    }

    /// Mask from already-clean booleans
    pub fn from_flags(flushed: Vec<bool>) -> Self {
        Self {
            flushed,
            anomalies: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.flushed.len()
    }

    /// True for an empty series
    pub fn is_empty(&self) -> bool {
        self.flushed.is_empty()
    }

    /// Whether row `i` counts as flushed. Rows past the end are not.
    pub fn is_flushed(&self, i: usize) -> bool {
        self.flushed.get(i).copied().unwrap_or(false)
    }

    /// Flush cells that were neither 0 nor 1
    pub fn anomalies(&self) -> &[FlushAnomaly] {
        &self.anomalies
    }

    /// Copy of `values` with flushed rows set to `NaN`
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| if self.is_flushed(i) { f64::NAN } else { v })
            .collect()
    }
}

/// Sequential fold producing a cumulative series that skips flushed rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlushAwareAccumulator {
    seed: f64,
}

impl Default for FlushAwareAccumulator {
    fn default() -> Self {
        Self { seed: 0.0 }
    }
}

impl FlushAwareAccumulator {
    /// Accumulator whose row 0 is `seed`
    pub fn new(seed: f64) -> Self {
        Self { seed }
    }

    /// Row-0 value
    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// Fold `increments` into a cumulative series.
    ///
    /// - `C[0] = seed`, whatever row 0's flush state.
    /// - normal row `i`: `C[i] = C[last] + Δ[i]`, then `last = i`.
    /// - flushed row `i`: `C[i] = NaN`, `last` unchanged.
    pub fn accumulate(&self, increments: &[f64], mask: &FlushMask) -> Vec<f64> {
        let mut cumulative = Vec::with_capacity(increments.len());
        if increments.is_empty() {
            return cumulative;
        }

        cumulative.push(self.seed);
        let mut last_valid = 0;

        for (i, delta) in increments.iter().enumerate().skip(1) {
            if mask.is_flushed(i) {
                cumulative.push(f64::NAN);
            } else {
                cumulative.push(cumulative[last_valid] + delta);
                last_valid = i;
            }
        }

        cumulative
    }
}

/// Scale a cumulative series to dry matter, keeping flushed rows undefined.
///
/// Row 0 is set to `seed` rather than scaled.
pub fn dry_mass_normalized(cumulative: &[f64], mask: &FlushMask, factor: f64, seed: f64) -> Vec<f64> {
    cumulative
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if i == 0 {
                seed
            } else if mask.is_flushed(i) {
                f64::NAN
            } else {
                c * factor
            }
        })
        .collect()
}

/// Plain prefix sum; one undefined increment leaves every later value undefined
pub fn running_sum(increments: &[f64]) -> Vec<f64> {
    increments
        .iter()
        .scan(0.0, |acc, &d| {
            *acc += d;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_series(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            if e.is_nan() {
                assert!(a.is_nan(), "row {}: expected NaN, got {}", i, a);
            } else {
                assert!((a - e).abs() < 1e-12, "row {}: expected {}, got {}", i, e, a);
            }
        }
    }

    #[test]
    fn test_skips_flushed_rows() {
        let deltas = [0.0, 2.0, f64::NAN, 4.0, f64::NAN];
        let mask = FlushMask::resolve(&[0.0, 0.0, 1.0, 0.0, 1.0], FlushPolicy::default()).unwrap();

        let c = FlushAwareAccumulator::new(0.0).accumulate(&deltas, &mask);
        assert_series(&c, &[0.0, 2.0, f64::NAN, 6.0, f64::NAN]);
    }

    #[test]
    fn test_seed_ignores_row_zero_flush() {
        let deltas = [9.0, 1.0, 1.0];
        let mask = FlushMask::resolve(&[1.0, 0.0, 0.0], FlushPolicy::default()).unwrap();

        let c = FlushAwareAccumulator::new(5.0).accumulate(&deltas, &mask);
        assert_series(&c, &[5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_consecutive_flushes_carry_base_forward() {
        let deltas = [0.0, 1.0, 100.0, 100.0, 3.0];
        let mask = FlushMask::from_flags(vec![false, false, true, true, false]);

        let c = FlushAwareAccumulator::default().accumulate(&deltas, &mask);
        assert_series(&c, &[0.0, 1.0, f64::NAN, f64::NAN, 4.0]);
    }

    #[test]
    fn test_undefined_increment_on_normal_row_propagates_once() {
        let deltas = [0.0, f64::NAN, 1.0];
        let mask = FlushMask::from_flags(vec![false; 3]);

        let c = FlushAwareAccumulator::default().accumulate(&deltas, &mask);
        assert_series(&c, &[0.0, f64::NAN, f64::NAN]);
    }

    #[test]
    fn test_empty_series() {
        let c = FlushAwareAccumulator::default().accumulate(&[], &FlushMask::default());
        assert!(c.is_empty());
    }

    #[test]
    fn test_anomaly_policies() {
        let flush = [0.0, 2.0, 0.0];
        let deltas = [0.0, 1.0, 1.0];

        let as_flushed = FlushMask::resolve(&flush, FlushPolicy::TreatAsFlushed).unwrap();
        assert_eq!(as_flushed.anomalies(), &[FlushAnomaly { row: 1, value: Some(2.0) }]);
        let c = FlushAwareAccumulator::default().accumulate(&deltas, &as_flushed);
        assert_series(&c, &[0.0, f64::NAN, 1.0]);

        let as_normal = FlushMask::resolve(&flush, FlushPolicy::TreatAsNormal).unwrap();
        assert_eq!(as_normal.anomalies().len(), 1);
        let c = FlushAwareAccumulator::default().accumulate(&deltas, &as_normal);
        assert_series(&c, &[0.0, 1.0, 2.0]);

        let err = FlushMask::resolve(&flush, FlushPolicy::Reject).unwrap_err();
        assert_eq!(err.anomalies[0].row, 1);
    }

    #[test]
    fn test_empty_flush_cell_is_anomaly() {
        let mask = FlushMask::resolve(&[0.0, f64::NAN], FlushPolicy::default()).unwrap();
        assert_eq!(mask.anomalies(), &[FlushAnomaly { row: 1, value: None }]);
        assert!(mask.is_flushed(1));
    }

    #[test]
    fn test_integrity_error_message() {
        let err = FlushMask::resolve(&[0.0, f64::NAN, 3.0], FlushPolicy::Reject).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Flush indicator must be 0 or 1; found 2 invalid value(s), first at row 1 (empty)"
        );
    }

    #[test]
    fn test_dry_mass_normalized_reapplies_mask() {
        let cumulative = [0.0, 2.0, f64::NAN, 6.0];
        let mask = FlushMask::from_flags(vec![true, false, true, false]);

        let out = dry_mass_normalized(&cumulative, &mask, 10.0, 0.0);
        assert_series(&out, &[0.0, 20.0, f64::NAN, 60.0]);
    }

    #[test]
    fn test_running_sum_poisons_after_nan() {
        let out = running_sum(&[1.0, 2.0, f64::NAN, 4.0]);
        assert_series(&out, &[1.0, 3.0, f64::NAN, f64::NAN]);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("reject".parse::<FlushPolicy>().unwrap(), FlushPolicy::Reject);
        assert_eq!("Treat-As-Normal".parse::<FlushPolicy>().unwrap(), FlushPolicy::TreatAsNormal);
        assert!("maybe".parse::<FlushPolicy>().is_err());
    }
}
