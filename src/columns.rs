//! Column names as constants for type safety.
//!
//! Input names match the header row of the measurement sheet; derived names
//! are stable and documented so downstream tooling can address them.

// =============================================================================
// Input columns
// =============================================================================

/// Sampling date (text)
pub const DATE: &str = "Date";
/// Sampling time of day (text)
pub const TIME: &str = "Time";
/// Raw methane reading [%]
pub const CH4: &str = "CH4 [%]";
/// Raw carbon dioxide reading [%]
pub const CO2: &str = "CO2 [%]";
/// Raw oxygen reading [%]
pub const O2: &str = "O2 [%]";
/// Raw nitrogen reading [%]
pub const N2: &str = "N2 [%]";
/// Headspace pressure before the GC sample was taken [hPa]
pub const PRESSURE_BEFORE: &str = "P sample before gc [hPa]";
/// Headspace pressure after the GC sample was taken [hPa]
pub const PRESSURE_AFTER: &str = "P sample after gc [hPa]";
/// Flush indicator (1 = headspace exchanged with atmosphere, 0 = normal step)
pub const FLUSH: &str = "Flush (1=yes; 0=no)";
/// GC method the sample was run with (`LM`, `HM` or `VHM`); optional
pub const GC_METHOD: &str = "GC method";
/// Sample weight recorded when the headspace is flushed [g]; optional
pub const SAMPLE_WEIGHT: &str = "Weight [g]";

/// Accepted values of the GC method column
pub const GC_METHODS: &[&str] = &["LM", "HM", "VHM"];

// =============================================================================
// Elapsed time
// =============================================================================

/// Days since the first sampling event
pub const DAY: &str = "Day";

// =============================================================================
// Gas composition
// =============================================================================

/// Sum of the four raw readings [%]
pub const SUM: &str = "Sum [%]";
/// Corrected methane [%]
pub const CH4_CORR: &str = "CH4-corr [%]";
/// Corrected carbon dioxide [%]
pub const CO2_CORR: &str = "CO2-corr [%]";
/// Corrected oxygen [%]
pub const O2_CORR: &str = "O2-corr [%]";
/// Corrected nitrogen [%]
pub const N2_CORR: &str = "N2-corr [%]";
/// Sum of the corrected readings, 100 barring rounding [%]
pub const SUM_CORR: &str = "Sum-corr [%]";

// =============================================================================
// Molar quantities
// =============================================================================

/// Total headspace gas before sampling [mol]
pub const MOL_GAS_BEFORE: &str = "mg_bs";
/// CO2 before sampling [mol]
pub const MOL_CO2_BEFORE: &str = "mCO2_b";
/// CH4 before sampling [mol]
pub const MOL_CH4_BEFORE: &str = "mCH4_b";
/// O2 before sampling [mol]
pub const MOL_O2_BEFORE: &str = "mO2_b";
/// N2 before sampling [mol]
pub const MOL_N2_BEFORE: &str = "mN2_b";
/// Carbon (CO2 + CH4) before sampling [mol]
pub const MOL_CARBON_BEFORE: &str = "mCTot_b";
/// Total headspace gas after sampling [mol]
pub const MOL_GAS_AFTER: &str = "mg_as";
/// CO2 after sampling [mol]
pub const MOL_CO2_AFTER: &str = "mCO2_a";
/// CH4 after sampling [mol]
pub const MOL_CH4_AFTER: &str = "mCH4_a";
/// O2 after sampling [mol]
pub const MOL_O2_AFTER: &str = "mO2_a";
/// N2 after sampling [mol]
pub const MOL_N2_AFTER: &str = "mN2_a";
/// Carbon (CO2 + CH4) after sampling [mol]
pub const MOL_CARBON_AFTER: &str = "mCTot_a";

// =============================================================================
// Gas-phase balance
// =============================================================================

/// Carbon produced during the step [mol]
pub const CARBON_PRODUCED: &str = "mCTot_produced";
/// Oxygen consumed during the step [mol]
pub const O2_CONSUMED: &str = "O2 consumed";
/// CO2 produced during the step [mol]
pub const CO2_PRODUCED: &str = "CO2 produced";
/// Cumulative oxygen consumed [mol]
pub const O2_CONSUMED_CUM: &str = "O2 consumed_cum";
/// Cumulative CO2 produced [mol]
pub const CO2_PRODUCED_CUM: &str = "CO2 produced_cum";
/// Cumulative carbon produced [mol]
pub const CARBON_PRODUCED_CUM: &str = "mCTot_produced_cum";
/// Cumulative gas-phase carbon per dry matter [mg C/g DW]
pub const CARBON_GAS_DRY_MASS_CUM: &str = "Cgas_DM_cum";

// =============================================================================
// Aqueous-phase balance
// =============================================================================

/// CO2 partial pressure before sampling [Pa]
pub const PP_CO2_BEFORE: &str = "PP CO2_b [Pa]";
/// Dissolved CO2 concentration before sampling [mol/m3]
pub const CO2_AQ_BEFORE_CONC: &str = "CO2_b_aq [mol/m3]";
/// Dissolved CO2 amount before sampling [mol]
pub const CO2_AQ_BEFORE: &str = "CO2_b_aq [mol]";
/// CO2 partial pressure after sampling [Pa]
pub const PP_CO2_AFTER: &str = "PP CO2_a [Pa]";
/// Dissolved CO2 concentration after sampling [mol/m3]
pub const CO2_AQ_AFTER_CONC: &str = "CO2_a_aq [mol/m3]";
/// Dissolved CO2 amount after sampling [mol]
pub const CO2_AQ_AFTER: &str = "CO2_a_aq [mol]";
/// CO2 dissolved between two sampling events [mol]
pub const CO2_DISSOLVED_STEP: &str = "CO2_dissolved_between_time_steps_aq";
/// Cumulative dissolved CO2 [mol]
pub const CO2_AQ_CUM: &str = "CO2_produced_aq_cum";
/// Cumulative dissolved inorganic carbon per dry matter [mg C/g DW]
pub const DIC_CUM: &str = "DIC_cum";

// =============================================================================
// Results
// =============================================================================

/// Total carbon (gas + dissolved) per dry matter [mg C/g DW]
pub const TOTAL_CARBON_DRY_MATTER: &str = "Ctot_DM [mg C/gDW]";
/// Oxygen consumed over CO2 produced (gas + dissolved)
pub const RATIO_O2_CO2: &str = "Ratio O2/CO2";

/// Raw inputs that must be numeric.
pub const NUMERIC_INPUTS: &[&str] = &[CH4, CO2, O2, N2, PRESSURE_BEFORE, PRESSURE_AFTER, FLUSH];

/// Raw inputs the core pipeline cannot run without.
pub const REQUIRED_INPUTS: &[&str] = NUMERIC_INPUTS;
