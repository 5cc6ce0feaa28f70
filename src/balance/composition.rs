//! Gas composition normalisation.
//!
//! The GC reports CH4, CO2, O2 and N2 independently, so the four readings
//! rarely add up to exactly 100 %. Each reading is rescaled by `100 / sum`.
//! A zero sum yields `NaN`/`inf` cells, which flow downstream as
//! indeterminate values rather than errors.

use serde::{Deserialize, Serialize};

/// One set of CH4/CO2/O2/N2 readings [%]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasFractions {
    /// Methane [%]
    pub ch4: f64,
    /// Carbon dioxide [%]
    pub co2: f64,
    /// Oxygen [%]
    pub o2: f64,
    /// Nitrogen [%]
    pub n2: f64,
}

impl GasFractions {
    /// Dry atmospheric reference composition used as the row-0 baseline
    pub const ATMOSPHERE: GasFractions = GasFractions {
        ch4: 0.0,
        co2: 0.03,
        o2: 21.90,
        n2: 78.07,
    };

    /// Sum of the four readings
    pub fn total(&self) -> f64 {
        self.ch4 + self.co2 + self.o2 + self.n2
    }

    /// Rescale so the readings sum to 100
    pub fn normalized(&self) -> GasFractions {
        let scale = 100.0 / self.total();
        GasFractions {
            ch4: scale * self.ch4,
            co2: scale * self.co2,
            o2: scale * self.o2,
            n2: scale * self.n2,
        }
    }
}

/// Borrowed view of the four raw reading columns
#[derive(Debug, Clone, Copy)]
pub struct CompositionColumns<'a> {
    /// Methane [%]
    pub ch4: &'a [f64],
    /// Carbon dioxide [%]
    pub co2: &'a [f64],
    /// Oxygen [%]
    pub o2: &'a [f64],
    /// Nitrogen [%]
    pub n2: &'a [f64],
}

impl CompositionColumns<'_> {
    fn row(&self, i: usize) -> GasFractions {
        GasFractions {
            ch4: self.ch4[i],
            co2: self.co2[i],
            o2: self.o2[i],
            n2: self.n2[i],
        }
    }

    fn len(&self) -> usize {
        self.ch4
            .len()
            .min(self.co2.len())
            .min(self.o2.len())
            .min(self.n2.len())
    }
}

/// Owned CH4/CO2/O2/N2 columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    /// Methane [%]
    pub ch4: Vec<f64>,
    /// Carbon dioxide [%]
    pub co2: Vec<f64>,
    /// Oxygen [%]
    pub o2: Vec<f64>,
    /// Nitrogen [%]
    pub n2: Vec<f64>,
}

impl Composition {
    /// Copy raw columns, replacing row 0 with `baseline` when given
    pub fn with_baseline(raw: CompositionColumns<'_>, baseline: Option<GasFractions>) -> Self {
        let mut composition = Composition {
            ch4: raw.ch4.to_vec(),
            co2: raw.co2.to_vec(),
            o2: raw.o2.to_vec(),
            n2: raw.n2.to_vec(),
        };
        if let Some(b) = baseline {
            if raw.len() > 0 {
                composition.ch4[0] = b.ch4;
                composition.co2[0] = b.co2;
                composition.o2[0] = b.o2;
                composition.n2[0] = b.n2;
            }
        }
        composition
    }

    /// Borrow as column slices
    pub fn columns(&self) -> CompositionColumns<'_> {
        CompositionColumns {
            ch4: &self.ch4,
            co2: &self.co2,
            o2: &self.o2,
            n2: &self.n2,
        }
    }

    fn push(&mut self, g: GasFractions) {
        self.ch4.push(g.ch4);
        self.co2.push(g.co2);
        self.o2.push(g.o2);
        self.n2.push(g.n2);
    }
}

/// Output of [`normalize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedComposition {
    /// Raw sum per row [%]
    pub sum: Vec<f64>,
    /// Corrected readings [%]
    pub corrected: Composition,
    /// Sum of corrected readings per row [%]
    pub sum_corrected: Vec<f64>,
}

/// Rescale every row so its four readings sum to 100 %
pub fn normalize(raw: CompositionColumns<'_>) -> NormalizedComposition {
    let n = raw.len();
    let mut out = NormalizedComposition {
        sum: Vec::with_capacity(n),
        corrected: Composition::default(),
        sum_corrected: Vec::with_capacity(n),
    };

    for i in 0..n {
        let row = raw.row(i);
        let corrected = row.normalized();
        out.sum.push(row.total());
        out.sum_corrected.push(corrected.total());
        out.corrected.push(corrected);
    }

    out
}
