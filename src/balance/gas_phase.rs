//! Gas-phase step balance.
//!
//! The increment of a species over step `i` compares the headspace before
//! this sample with the headspace left behind after the previous sample:
//! `before[i] − after[i−1]`. CO2 and carbon count rising amounts as
//! production; O2 counts falling amounts as consumption. A flushed step is
//! undefined because the headspace was replaced in between.

use super::accumulate::{dry_mass_normalized, FlushAwareAccumulator, FlushMask};
use super::molar::MolarSnapshot;

/// Sign convention for a step increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `before[i] − after[i−1]`
    Produced,
    /// `−(before[i] − after[i−1])`
    Consumed,
}

/// Per-step increments of one species, masked on flushed rows.
///
/// Row 0 has no previous sample and takes `seed`.
pub fn step_increments(
    before: &[f64],
    after: &[f64],
    mask: &FlushMask,
    direction: Direction,
    seed: f64,
) -> Vec<f64> {
    let sign = match direction {
        Direction::Produced => 1.0,
        Direction::Consumed => -1.0,
    };

    let n = before.len().min(after.len());
    (0..n)
        .map(|i| {
            if i == 0 {
                seed
            } else if mask.is_flushed(i) {
                f64::NAN
            } else {
                sign * (before[i] - after[i - 1])
            }
        })
        .collect()
}

/// Step and cumulative gas-phase quantities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GasPhaseBalance {
    /// O2 consumed per step [mol]
    pub o2_consumed: Vec<f64>,
    /// CO2 produced per step [mol]
    pub co2_produced: Vec<f64>,
    /// Carbon (CO2 + CH4) produced per step [mol]
    pub carbon_produced: Vec<f64>,
    /// Cumulative O2 consumed [mol]
    pub o2_consumed_cum: Vec<f64>,
    /// Cumulative CO2 produced [mol]
    pub co2_produced_cum: Vec<f64>,
    /// Cumulative carbon produced [mol]
    pub carbon_produced_cum: Vec<f64>,
    /// Cumulative carbon per dry matter [mg C/g DW]
    pub carbon_dry_mass_cum: Vec<f64>,
}

impl GasPhaseBalance {
    /// Step increments from before/after snapshots; cumulative fields empty
    pub fn steps(before: &MolarSnapshot, after: &MolarSnapshot, mask: &FlushMask, seed: f64) -> Self {
        Self {
            o2_consumed: step_increments(&before.o2, &after.o2, mask, Direction::Consumed, seed),
            co2_produced: step_increments(&before.co2, &after.co2, mask, Direction::Produced, seed),
            carbon_produced: step_increments(&before.carbon, &after.carbon, mask, Direction::Produced, seed),
            ..Default::default()
        }
    }

    /// Fill the cumulative fields from the step increments.
    ///
    /// `dry_mass_factor` is `molar_mass_carbon · 1000 / dry_mass_sample`.
    pub fn accumulate(mut self, mask: &FlushMask, seed: f64, dry_mass_factor: f64) -> Self {
        let acc = FlushAwareAccumulator::new(seed);
        self.o2_consumed_cum = acc.accumulate(&self.o2_consumed, mask);
        self.co2_produced_cum = acc.accumulate(&self.co2_produced, mask);
        self.carbon_produced_cum = acc.accumulate(&self.carbon_produced, mask);
        self.carbon_dry_mass_cum = dry_mass_normalized(&self.carbon_produced_cum, mask, dry_mass_factor, seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_produced_and_consumed_signs() {
        let before = [10.0, 12.0, 15.0];
        let after = [9.0, 11.0, 14.0];
        let mask = FlushMask::from_flags(vec![false; 3]);

        let produced = step_increments(&before, &after, &mask, Direction::Produced, 0.0);
        assert_eq!(produced, vec![0.0, 3.0, 4.0]);

        let consumed = step_increments(&before, &after, &mask, Direction::Consumed, 0.0);
        assert_eq!(consumed, vec![0.0, -3.0, -4.0]);
    }

    #[test]
    fn test_flushed_step_is_undefined() {
        let before = [10.0, 12.0, 15.0];
        let after = [9.0, 11.0, 14.0];
        let mask = FlushMask::from_flags(vec![false, true, false]);

        let produced = step_increments(&before, &after, &mask, Direction::Produced, 0.0);
        assert_eq!(produced[0], 0.0);
        assert!(produced[1].is_nan());
        assert_eq!(produced[2], 4.0);
    }

    #[test]
    fn test_row_zero_seed_and_flush() {
        let mask = FlushMask::from_flags(vec![false, false]);
        let steps = step_increments(&[1.0, 2.0], &[1.0, 1.0], &mask, Direction::Produced, 7.0);
        assert_eq!(steps, vec![7.0, 1.0]);

        let mask = FlushMask::from_flags(vec![true, false]);
        let steps = step_increments(&[1.0, 2.0], &[1.0, 1.0], &mask, Direction::Produced, 7.0);
        assert_eq!(steps, vec![7.0, 1.0]);
    }

    #[test]
    fn test_balance_accumulates_and_normalizes() {
        let before = MolarSnapshot {
            o2: vec![20.0, 18.0, 21.0, 17.0],
            co2: vec![0.0, 2.0, 0.0, 3.0],
            carbon: vec![0.0, 2.0, 0.0, 3.0],
            ..Default::default()
        };
        let after = MolarSnapshot {
            o2: vec![19.5, 17.5, 20.5, 16.5],
            co2: vec![0.0, 1.5, 0.0, 2.5],
            carbon: vec![0.0, 1.5, 0.0, 2.5],
            ..Default::default()
        };
        let mask = FlushMask::from_flags(vec![false, false, true, false]);

        let balance = GasPhaseBalance::steps(&before, &after, &mask, 0.0).accumulate(&mask, 0.0, 1000.0);

        assert_eq!(balance.o2_consumed[1], 1.5);
        assert!(balance.o2_consumed[2].is_nan());
        // Row 3 compares against the flushed row's after-sample.
        assert_eq!(balance.o2_consumed[3], 3.5);
        assert_eq!(balance.o2_consumed_cum[3], 5.0);
        assert_eq!(balance.carbon_produced_cum[1], 2.0);
        assert_eq!(balance.carbon_produced_cum[3], 5.0);
        assert_eq!(balance.carbon_dry_mass_cum[3], 5000.0);
        assert!(balance.carbon_dry_mass_cum[2].is_nan());
    }
}
