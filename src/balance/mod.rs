//! # Mass-balance computations
//!
//! Pure column-in, column-out functions for each step of the balance,
//! leaves first:
//!
//! 1. [`composition`]: rescale CH4/CO2/O2/N2 readings to 100 %
//! 2. [`molar`]: ideal-gas conversion of pressure into moles per species
//! 3. [`gas_phase`]: per-step production/consumption in the headspace
//! 4. [`accumulate`]: flush-aware cumulative fold
//! 5. [`aqueous`]: Henry's-law dissolved CO2 and its own balance
//! 6. [`results`]: dry-matter totals and the O2/CO2 ratio
//!
//! [`elapsed`] derives the time axis from the sheet's date/time cells.
//!
//! Undefined values are `f64::NAN` and propagate through every function;
//! none of them fail on arithmetic.

pub mod accumulate;
pub mod aqueous;
pub mod composition;
pub mod elapsed;
pub mod gas_phase;
pub mod molar;
pub mod results;

pub use accumulate::{FlushAnomaly, FlushAwareAccumulator, FlushIntegrityError, FlushMask, FlushPolicy};
pub use aqueous::{AqueousPhaseBalance, AqueousStrategy};
pub use composition::{GasFractions, NormalizedComposition};
pub use gas_phase::GasPhaseBalance;
pub use molar::MolarSnapshot;
