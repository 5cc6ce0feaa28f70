//! Ideal-gas conversion of headspace pressure into moles.
//!
//! `n = P[hPa] · 100 · V / (R · T)`, then each species takes its corrected
//! share of the total. All operations are row-local; missing inputs
//! propagate as `NaN`.

use crate::constants::ConstantsRecord;

use super::composition::CompositionColumns;

/// Moles of gas per hPa of headspace pressure: `100 · V / (R · T)`
pub fn molar_factor(constants: &ConstantsRecord) -> f64 {
    100.0 * constants.headspace_volume / (constants.gas_constant * constants.temperature)
}

/// Total headspace moles for each pressure reading
pub fn total_moles(pressure_hpa: &[f64], constants: &ConstantsRecord) -> Vec<f64> {
    let factor = molar_factor(constants);
    pressure_hpa.iter().map(|p| p * factor).collect()
}

/// Moles of one species from total moles and its corrected share [%]
pub fn species_moles(total: &[f64], corrected_percent: &[f64]) -> Vec<f64> {
    total
        .iter()
        .zip(corrected_percent)
        .map(|(n, pct)| n * pct / 100.0)
        .collect()
}

/// Moles of each species at one sampling moment (before or after)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolarSnapshot {
    /// Total headspace gas [mol]
    pub total: Vec<f64>,
    /// CO2 [mol]
    pub co2: Vec<f64>,
    /// CH4 [mol]
    pub ch4: Vec<f64>,
    /// O2 [mol]
    pub o2: Vec<f64>,
    /// N2 [mol]
    pub n2: Vec<f64>,
    /// Carbon in the gas phase, CO2 + CH4 [mol]
    pub carbon: Vec<f64>,
}

impl MolarSnapshot {
    /// Convert one pressure column and the corrected composition
    pub fn from_pressure(
        pressure_hpa: &[f64],
        corrected: CompositionColumns<'_>,
        constants: &ConstantsRecord,
    ) -> Self {
        let total = total_moles(pressure_hpa, constants);
        let co2 = species_moles(&total, corrected.co2);
        let ch4 = species_moles(&total, corrected.ch4);
        let o2 = species_moles(&total, corrected.o2);
        let n2 = species_moles(&total, corrected.n2);
        let carbon = co2.iter().zip(&ch4).map(|(c, m)| c + m).collect();

        Self {
            total,
            co2,
            ch4,
            o2,
            n2,
            carbon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstantsRecord;

    fn constants() -> ConstantsRecord {
        ConstantsRecord {
            gas_constant: 8.314,
            temperature: 298.0,
            headspace_volume: 10.0,
            ..ConstantsRecord::default()
        }
    }

    #[test]
    fn test_molar_factor() {
        let factor = molar_factor(&constants());
        assert!((factor - 0.40362).abs() < 1e-5);
    }

    #[test]
    fn test_total_moles() {
        let moles = total_moles(&[1000.0, f64::NAN], &constants());
        assert!((moles[0] - 403.62).abs() < 0.01);
        assert!(moles[1].is_nan());
    }

    #[test]
    fn test_snapshot_species_and_carbon() {
        let ch4 = [1.0];
        let co2 = [4.0];
        let o2 = [20.0];
        let n2 = [75.0];
        let corrected = CompositionColumns {
            ch4: &ch4,
            co2: &co2,
            o2: &o2,
            n2: &n2,
        };

        let snap = MolarSnapshot::from_pressure(&[1000.0], corrected, &constants());
        let total = snap.total[0];

        assert!((snap.co2[0] - total * 0.04).abs() < 1e-9);
        assert!((snap.o2[0] - total * 0.20).abs() < 1e-9);
        assert!((snap.carbon[0] - total * 0.05).abs() < 1e-9);
        let species = snap.co2[0] + snap.ch4[0] + snap.o2[0] + snap.n2[0];
        assert!((species - total).abs() < 1e-9);
    }
}
