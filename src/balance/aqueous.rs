//! Dissolved CO2 in the liquid phase (Henry's law).
//!
//! The partial pressure of CO2 in the headspace sets the dissolved
//! concentration; multiplying by the water volume gives the dissolved
//! amount. The step-to-step change of that amount is the CO2 that moved
//! into (or out of) solution and must be added to the gas-phase balance.

use serde::{Deserialize, Serialize};

use super::accumulate::{running_sum, FlushAwareAccumulator, FlushMask};

/// Henry's-law constant for CO2 at 20 °C used when none is configured
pub const HENRY_CO2_20C: f64 = 5.23e-3;

/// How the dissolved-CO2 increments are accumulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AqueousStrategy {
    /// Same flush-skipping fold as the gas phase
    #[default]
    FlushAware,
    /// Plain cumulative sum over every row
    RunningSum,
}

impl AqueousStrategy {
    /// Accepted names for configuration and CLI input
    pub fn variants() -> &'static [&'static str] {
        &["flush-aware", "running-sum"]
    }
}

impl std::str::FromStr for AqueousStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flush-aware" => Ok(AqueousStrategy::FlushAware),
            "running-sum" | "cumsum" => Ok(AqueousStrategy::RunningSum),
            _ => Err(format!(
                "Unknown aqueous strategy '{}'. Valid options: {}",
                s,
                AqueousStrategy::variants().join(", ")
            )),
        }
    }
}

/// CO2 partial pressure [Pa] from pressure [hPa] and corrected CO2 [%].
///
/// An empty pressure cell at row 0 is read as 0.
pub fn partial_pressure_co2(pressure_hpa: &[f64], co2_corrected_percent: &[f64]) -> Vec<f64> {
    pressure_hpa
        .iter()
        .zip(co2_corrected_percent)
        .enumerate()
        .map(|(i, (&p, &co2))| {
            let p = if i == 0 && p.is_nan() { 0.0 } else { p };
            p * 100.0 * co2 / 100.0
        })
        .collect()
}

/// Dissolved concentration [mol/m3] = partial pressure [Pa] · Henry constant
pub fn dissolved_concentration(partial_pressure: &[f64], henry_constant: f64) -> Vec<f64> {
    partial_pressure.iter().map(|pp| pp * henry_constant).collect()
}

/// Dissolved amount [mol] = concentration [mol/m3] · water volume [L] / 1000
pub fn dissolved_moles(concentration: &[f64], water_volume_liters: f64) -> Vec<f64> {
    concentration
        .iter()
        .map(|c| c * (water_volume_liters / 1000.0))
        .collect()
}

/// Dissolved CO2 at one sampling moment (before or after)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DissolvedSnapshot {
    /// CO2 partial pressure [Pa]
    pub partial_pressure: Vec<f64>,
    /// Dissolved CO2 [mol/m3]
    pub concentration: Vec<f64>,
    /// Dissolved CO2 [mol]
    pub moles: Vec<f64>,
}

impl DissolvedSnapshot {
    /// Chain partial pressure, concentration and amount for one pressure column
    pub fn from_pressure(
        pressure_hpa: &[f64],
        co2_corrected_percent: &[f64],
        henry_constant: f64,
        water_volume_liters: f64,
    ) -> Self {
        let partial_pressure = partial_pressure_co2(pressure_hpa, co2_corrected_percent);
        let concentration = dissolved_concentration(&partial_pressure, henry_constant);
        let moles = dissolved_moles(&concentration, water_volume_liters);
        Self {
            partial_pressure,
            concentration,
            moles,
        }
    }
}

/// `before[i] − after[i−1]`; row 0 uses its own pair, `before[0] − after[0]`
pub fn dissolved_increments(before: &[f64], after: &[f64]) -> Vec<f64> {
    let n = before.len().min(after.len());
    (0..n)
        .map(|i| {
            let previous = if i == 0 { after[0] } else { after[i - 1] };
            before[i] - previous
        })
        .collect()
}

/// Cumulative dissolved CO2 [mol].
///
/// Both strategies start from the row-0 increment.
pub fn cumulative_dissolved(increments: &[f64], mask: &FlushMask, strategy: AqueousStrategy) -> Vec<f64> {
    match strategy {
        AqueousStrategy::RunningSum => running_sum(increments),
        AqueousStrategy::FlushAware => {
            let seed = increments.first().copied().unwrap_or(0.0);
            FlushAwareAccumulator::new(seed).accumulate(increments, mask)
        }
    }
}

/// Cumulative dissolved inorganic carbon [mg C/g DW].
///
/// `dry_mass_factor` is `molar_mass_carbon · 1000 / dry_mass_sample`.
/// Under [`AqueousStrategy::FlushAware`] flushed rows after row 0 stay
/// undefined.
pub fn dic_cumulative(
    cumulative: &[f64],
    mask: &FlushMask,
    dry_mass_factor: f64,
    strategy: AqueousStrategy,
) -> Vec<f64> {
    cumulative
        .iter()
        .enumerate()
        .map(|(i, &c)| match strategy {
            AqueousStrategy::FlushAware if i > 0 && mask.is_flushed(i) => f64::NAN,
            _ => c * dry_mass_factor,
        })
        .collect()
}

/// Every aqueous-phase column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AqueousPhaseBalance {
    /// Dissolved CO2 before sampling
    pub before: DissolvedSnapshot,
    /// Dissolved CO2 after sampling
    pub after: DissolvedSnapshot,
    /// CO2 dissolved between sampling events [mol]
    pub dissolved_step: Vec<f64>,
    /// Cumulative dissolved CO2 [mol]
    pub dissolved_cum: Vec<f64>,
    /// Cumulative dissolved inorganic carbon [mg C/g DW]
    pub dic_cum: Vec<f64>,
}

/// Inputs for [`AqueousPhaseBalance::compute`]
#[derive(Debug, Clone, Copy)]
pub struct AqueousInputs<'a> {
    /// Pressure before sampling [hPa]
    pub pressure_before: &'a [f64],
    /// Pressure after sampling [hPa]
    pub pressure_after: &'a [f64],
    /// Corrected CO2 [%]
    pub co2_corrected: &'a [f64],
    /// Henry's-law constant for CO2
    pub henry_constant: f64,
    /// Water volume [L]
    pub water_volume_liters: f64,
    /// `molar_mass_carbon · 1000 / dry_mass_sample`
    pub dry_mass_factor: f64,
}

impl AqueousPhaseBalance {
    /// Compute the full aqueous chain
    pub fn compute(inputs: AqueousInputs<'_>, mask: &FlushMask, strategy: AqueousStrategy) -> Self {
        let before = DissolvedSnapshot::from_pressure(
            inputs.pressure_before,
            inputs.co2_corrected,
            inputs.henry_constant,
            inputs.water_volume_liters,
        );
        let after = DissolvedSnapshot::from_pressure(
            inputs.pressure_after,
            inputs.co2_corrected,
            inputs.henry_constant,
            inputs.water_volume_liters,
        );
        let dissolved_step = dissolved_increments(&before.moles, &after.moles);
        let dissolved_cum = cumulative_dissolved(&dissolved_step, mask, strategy);
        let dic_cum = dic_cumulative(&dissolved_cum, mask, inputs.dry_mass_factor, strategy);

        Self {
            before,
            after,
            dissolved_step,
            dissolved_cum,
            dic_cum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_pressure_units() {
        // 1000 hPa at 2 % CO2 is 2000 Pa
        let pp = partial_pressure_co2(&[1000.0], &[2.0]);
        assert!((pp[0] - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_first_pressure_reads_as_zero() {
        let pp = partial_pressure_co2(&[f64::NAN, f64::NAN], &[1.0, 1.0]);
        assert_eq!(pp[0], 0.0);
        assert!(pp[1].is_nan());
    }

    #[test]
    fn test_dissolved_chain() {
        let snap = DissolvedSnapshot::from_pressure(&[1000.0], &[2.0], HENRY_CO2_20C, 500.0);
        assert!((snap.concentration[0] - 2000.0 * 5.23e-3).abs() < 1e-12);
        assert!((snap.moles[0] - 2000.0 * 5.23e-3 * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_increments_row_zero_uses_own_pair() {
        let steps = dissolved_increments(&[5.0, 7.0, 9.0], &[4.0, 6.0, 8.0]);
        assert_eq!(steps, vec![1.0, 3.0, 3.0]);
    }

    #[test]
    fn test_strategies_differ_on_undefined_step() {
        let steps = [1.0, 2.0, f64::NAN, 3.0];
        let mask = FlushMask::from_flags(vec![false, false, true, false]);

        let fold = cumulative_dissolved(&steps, &mask, AqueousStrategy::FlushAware);
        assert_eq!(fold[0], 1.0);
        assert_eq!(fold[1], 3.0);
        assert!(fold[2].is_nan());
        assert_eq!(fold[3], 6.0);

        let sum = cumulative_dissolved(&steps, &mask, AqueousStrategy::RunningSum);
        assert_eq!(sum[1], 3.0);
        assert!(sum[2].is_nan());
        assert!(sum[3].is_nan());
    }

    #[test]
    fn test_dic_masking_by_strategy() {
        let cum = [1.0, 2.0, 3.0];
        let mask = FlushMask::from_flags(vec![true, true, false]);

        let masked = dic_cumulative(&cum, &mask, 2.0, AqueousStrategy::FlushAware);
        assert_eq!(masked[0], 2.0);
        assert!(masked[1].is_nan());
        assert_eq!(masked[2], 6.0);

        let plain = dic_cumulative(&cum, &mask, 2.0, AqueousStrategy::RunningSum);
        assert_eq!(plain, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("cumsum".parse::<AqueousStrategy>().unwrap(), AqueousStrategy::RunningSum);
        assert!("other".parse::<AqueousStrategy>().is_err());
    }
}
