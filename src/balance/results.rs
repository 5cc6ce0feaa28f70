//! Dry-matter totals and the respiratory quotient.

use super::accumulate::FlushMask;

/// Gas-phase plus dissolved carbon per dry matter [mg C/g DW].
///
/// Row 0 is `seed`; flushed rows are undefined.
pub fn total_carbon_dry_matter(gas_dry_mass_cum: &[f64], dic_cum: &[f64], mask: &FlushMask, seed: f64) -> Vec<f64> {
    gas_dry_mass_cum
        .iter()
        .zip(dic_cum)
        .enumerate()
        .map(|(i, (gas, dic))| {
            if i == 0 {
                seed
            } else if mask.is_flushed(i) {
                f64::NAN
            } else {
                gas + dic
            }
        })
        .collect()
}

/// O2 consumed over CO2 produced, counting CO2 that dissolved in the
/// liquid phase as produced.
///
/// Row 0 is `seed`; flushed rows and zero denominators are undefined.
pub fn o2_co2_ratio(
    o2_consumed: &[f64],
    co2_produced_gas: &[f64],
    co2_dissolved_step: &[f64],
    mask: &FlushMask,
    seed: f64,
) -> Vec<f64> {
    let n = o2_consumed
        .len()
        .min(co2_produced_gas.len())
        .min(co2_dissolved_step.len());

    (0..n)
        .map(|i| {
            if i == 0 {
                return seed;
            }
            if mask.is_flushed(i) {
                return f64::NAN;
            }
            let denominator = co2_produced_gas[i] + co2_dissolved_step[i];
            if denominator == 0.0 {
                f64::NAN
            } else {
                o2_consumed[i] / denominator
            }
        })
        .collect()
}
