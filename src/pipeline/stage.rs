//! Pipeline stages.
//!
//! Each stage declares the columns it reads, receives an immutable view of
//! the table built so far and returns new columns. The driver checks the
//! declared inputs before calling [`Stage::compute`] and writes the
//! returned columns back, so a stage never sees a half-built table.

use log::{debug, info};

use crate::balance::aqueous::{AqueousInputs, AqueousPhaseBalance};
use crate::balance::composition::{normalize, Composition, CompositionColumns};
use crate::balance::elapsed::elapsed_days;
use crate::balance::gas_phase::GasPhaseBalance;
use crate::balance::molar::MolarSnapshot;
use crate::balance::results::{o2_co2_ratio, total_carbon_dry_matter};
use crate::balance::FlushMask;
use crate::columns;
use crate::constants::ConstantsRecord;
use crate::table::ColumnTable;

use super::{PipelineError, PipelineOptions};

/// Columns returned by a stage, in output order
pub type StageOutput = Vec<(&'static str, Vec<f64>)>;

/// Read-only view handed to [`Stage::compute`]
pub struct StageContext<'a> {
    stage: &'static str,
    table: &'a ColumnTable,
    constants: &'a ConstantsRecord,
    options: &'a PipelineOptions,
    mask: &'a FlushMask,
}

impl<'a> StageContext<'a> {
    pub(crate) fn new(
        stage: &'static str,
        table: &'a ColumnTable,
        constants: &'a ConstantsRecord,
        options: &'a PipelineOptions,
        mask: &'a FlushMask,
    ) -> Self {
        Self {
            stage,
            table,
            constants,
            options,
            mask,
        }
    }

    /// Numeric cells of a column produced by an earlier stage or loaded
    pub fn column(&self, name: &str) -> Result<&'a [f64], PipelineError> {
        self.table
            .float(name)
            .map_err(|e| PipelineError::from_table(self.stage, e))
    }

    /// Cells of a column rendered as text; float cells are formatted and
    /// `NaN` is empty
    pub fn text_cells(&self, name: &str) -> Result<Vec<String>, PipelineError> {
        let column = self.table.get(name).ok_or_else(|| PipelineError::MissingColumn {
            stage: self.stage,
            column: name.to_string(),
        })?;
        Ok((0..self.table.row_count())
            .map(|row| column.data.cell_to_string(row))
            .collect())
    }

    /// The table as built so far
    pub fn table(&self) -> &'a ColumnTable {
        self.table
    }

    /// Validated constants
    pub fn constants(&self) -> &'a ConstantsRecord {
        self.constants
    }

    /// Run options
    pub fn options(&self) -> &'a PipelineOptions {
        self.options
    }

    /// Resolved flush mask; empty for stages that do not use it
    pub fn mask(&self) -> &'a FlushMask {
        self.mask
    }

    /// Row-0 value of seeded columns
    pub fn seed(&self) -> f64 {
        self.options.first_row_value
    }
}

/// One step of the balance
pub trait Stage {
    /// Name used in logs, errors and the run report
    fn name(&self) -> &'static str;

    /// Columns that must exist before the stage runs
    fn inputs(&self) -> &'static [&'static str];

    /// Whether the stage reads the flush mask
    fn uses_flush(&self) -> bool {
        false
    }

    /// Optional stages are skipped instead of failing when an input is missing
    fn optional(&self) -> bool {
        false
    }

    /// Compute the stage's columns
    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError>;
}

/// The standard stage list in execution order
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(ElapsedTimeStage),
        Box::new(CompositionStage),
        Box::new(MolarStage),
        Box::new(GasStepStage),
        Box::new(GasCumulativeStage),
        Box::new(AqueousStage),
        Box::new(ResultsStage),
    ]
}

// =============================================================================
// Elapsed time
// =============================================================================

/// Derives `Day` from the date and time columns
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedTimeStage;

impl Stage for ElapsedTimeStage {
    fn name(&self) -> &'static str {
        "elapsed-time"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[columns::DATE, columns::TIME]
    }

    fn optional(&self) -> bool {
        true
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        if ctx.table().contains(columns::DAY) {
            info!("Keeping existing '{}' column", columns::DAY);
            return Ok(Vec::new());
        }

        let dates = ctx.text_cells(columns::DATE)?;
        let times = ctx.text_cells(columns::TIME)?;
        let days = elapsed_days(&dates, &times, ctx.options().day_first);

        Ok(vec![(columns::DAY, days)])
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Rescales CH4/CO2/O2/N2 to 100 %, optionally replacing row 0 first
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionStage;

impl Stage for CompositionStage {
    fn name(&self) -> &'static str {
        "composition"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[columns::CH4, columns::CO2, columns::O2, columns::N2]
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let raw = CompositionColumns {
            ch4: ctx.column(columns::CH4)?,
            co2: ctx.column(columns::CO2)?,
            o2: ctx.column(columns::O2)?,
            n2: ctx.column(columns::N2)?,
        };

        let baseline = ctx.options().baseline_composition;
        let composition = Composition::with_baseline(raw, baseline);
        let normalized = normalize(composition.columns());

        let mut out = Vec::with_capacity(10);
        if baseline.is_some() {
            debug!("Replacing row 0 composition with {:?}", baseline);
            out.push((columns::CH4, composition.ch4));
            out.push((columns::CO2, composition.co2));
            out.push((columns::O2, composition.o2));
            out.push((columns::N2, composition.n2));
        }
        out.push((columns::SUM, normalized.sum));
        out.push((columns::CH4_CORR, normalized.corrected.ch4));
        out.push((columns::CO2_CORR, normalized.corrected.co2));
        out.push((columns::O2_CORR, normalized.corrected.o2));
        out.push((columns::N2_CORR, normalized.corrected.n2));
        out.push((columns::SUM_CORR, normalized.sum_corrected));
        Ok(out)
    }
}

// =============================================================================
// Molar conversion
// =============================================================================

/// Ideal-gas moles before and after sampling
#[derive(Debug, Clone, Copy, Default)]
pub struct MolarStage;

impl Stage for MolarStage {
    fn name(&self) -> &'static str {
        "molar"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[
            columns::PRESSURE_BEFORE,
            columns::PRESSURE_AFTER,
            columns::CH4_CORR,
            columns::CO2_CORR,
            columns::O2_CORR,
            columns::N2_CORR,
        ]
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let corrected = CompositionColumns {
            ch4: ctx.column(columns::CH4_CORR)?,
            co2: ctx.column(columns::CO2_CORR)?,
            o2: ctx.column(columns::O2_CORR)?,
            n2: ctx.column(columns::N2_CORR)?,
        };

        let before = MolarSnapshot::from_pressure(ctx.column(columns::PRESSURE_BEFORE)?, corrected, ctx.constants());
        let after = MolarSnapshot::from_pressure(ctx.column(columns::PRESSURE_AFTER)?, corrected, ctx.constants());

        Ok(vec![
            (columns::MOL_GAS_BEFORE, before.total),
            (columns::MOL_CO2_BEFORE, before.co2),
            (columns::MOL_CH4_BEFORE, before.ch4),
            (columns::MOL_O2_BEFORE, before.o2),
            (columns::MOL_N2_BEFORE, before.n2),
            (columns::MOL_CARBON_BEFORE, before.carbon),
            (columns::MOL_GAS_AFTER, after.total),
            (columns::MOL_CO2_AFTER, after.co2),
            (columns::MOL_CH4_AFTER, after.ch4),
            (columns::MOL_O2_AFTER, after.o2),
            (columns::MOL_N2_AFTER, after.n2),
            (columns::MOL_CARBON_AFTER, after.carbon),
        ])
    }
}

// =============================================================================
// Gas phase
// =============================================================================

/// Per-step O2 consumed, CO2 and carbon produced
#[derive(Debug, Clone, Copy, Default)]
pub struct GasStepStage;

impl Stage for GasStepStage {
    fn name(&self) -> &'static str {
        "gas-steps"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[
            columns::MOL_O2_BEFORE,
            columns::MOL_O2_AFTER,
            columns::MOL_CO2_BEFORE,
            columns::MOL_CO2_AFTER,
            columns::MOL_CARBON_BEFORE,
            columns::MOL_CARBON_AFTER,
            columns::FLUSH,
        ]
    }

    fn uses_flush(&self) -> bool {
        true
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let snapshot = |o2: &str, co2: &str, carbon: &str| -> Result<MolarSnapshot, PipelineError> {
            Ok(MolarSnapshot {
                o2: ctx.column(o2)?.to_vec(),
                co2: ctx.column(co2)?.to_vec(),
                carbon: ctx.column(carbon)?.to_vec(),
                ..Default::default()
            })
        };
        let before = snapshot(columns::MOL_O2_BEFORE, columns::MOL_CO2_BEFORE, columns::MOL_CARBON_BEFORE)?;
        let after = snapshot(columns::MOL_O2_AFTER, columns::MOL_CO2_AFTER, columns::MOL_CARBON_AFTER)?;

        let steps = GasPhaseBalance::steps(&before, &after, ctx.mask(), ctx.seed());

        Ok(vec![
            (columns::CARBON_PRODUCED, steps.carbon_produced),
            (columns::O2_CONSUMED, steps.o2_consumed),
            (columns::CO2_PRODUCED, steps.co2_produced),
        ])
    }
}

/// Flush-aware cumulative gas-phase totals and their dry-matter form
#[derive(Debug, Clone, Copy, Default)]
pub struct GasCumulativeStage;

impl Stage for GasCumulativeStage {
    fn name(&self) -> &'static str {
        "gas-cumulative"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[columns::O2_CONSUMED, columns::CO2_PRODUCED, columns::CARBON_PRODUCED, columns::FLUSH]
    }

    fn uses_flush(&self) -> bool {
        true
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let steps = GasPhaseBalance {
            o2_consumed: ctx.column(columns::O2_CONSUMED)?.to_vec(),
            co2_produced: ctx.column(columns::CO2_PRODUCED)?.to_vec(),
            carbon_produced: ctx.column(columns::CARBON_PRODUCED)?.to_vec(),
            ..Default::default()
        };

        let balance = steps.accumulate(ctx.mask(), ctx.seed(), ctx.constants().dry_mass_factor());

        Ok(vec![
            (columns::O2_CONSUMED_CUM, balance.o2_consumed_cum),
            (columns::CO2_PRODUCED_CUM, balance.co2_produced_cum),
            (columns::CARBON_PRODUCED_CUM, balance.carbon_produced_cum),
            (columns::CARBON_GAS_DRY_MASS_CUM, balance.carbon_dry_mass_cum),
        ])
    }
}

// =============================================================================
// Aqueous phase
// =============================================================================

/// Dissolved CO2 and dissolved inorganic carbon
#[derive(Debug, Clone, Copy, Default)]
pub struct AqueousStage;

impl Stage for AqueousStage {
    fn name(&self) -> &'static str {
        "aqueous"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[columns::PRESSURE_BEFORE, columns::PRESSURE_AFTER, columns::CO2_CORR, columns::FLUSH]
    }

    fn uses_flush(&self) -> bool {
        true
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let constants = ctx.constants();
        let inputs = AqueousInputs {
            pressure_before: ctx.column(columns::PRESSURE_BEFORE)?,
            pressure_after: ctx.column(columns::PRESSURE_AFTER)?,
            co2_corrected: ctx.column(columns::CO2_CORR)?,
            henry_constant: constants.henry_constant_co2,
            water_volume_liters: constants.water_volume,
            dry_mass_factor: constants.dry_mass_factor(),
        };

        let aq = AqueousPhaseBalance::compute(inputs, ctx.mask(), ctx.options().aqueous_strategy);

        Ok(vec![
            (columns::PP_CO2_BEFORE, aq.before.partial_pressure),
            (columns::CO2_AQ_BEFORE_CONC, aq.before.concentration),
            (columns::CO2_AQ_BEFORE, aq.before.moles),
            (columns::PP_CO2_AFTER, aq.after.partial_pressure),
            (columns::CO2_AQ_AFTER_CONC, aq.after.concentration),
            (columns::CO2_AQ_AFTER, aq.after.moles),
            (columns::CO2_DISSOLVED_STEP, aq.dissolved_step),
            (columns::CO2_AQ_CUM, aq.dissolved_cum),
            (columns::DIC_CUM, aq.dic_cum),
        ])
    }
}

// =============================================================================
// Results
// =============================================================================

/// Total carbon per dry matter and the O2/CO2 ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsStage;

impl Stage for ResultsStage {
    fn name(&self) -> &'static str {
        "results"
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[
            columns::CARBON_GAS_DRY_MASS_CUM,
            columns::DIC_CUM,
            columns::O2_CONSUMED,
            columns::CO2_PRODUCED,
            columns::CO2_DISSOLVED_STEP,
            columns::FLUSH,
        ]
    }

    fn uses_flush(&self) -> bool {
        true
    }

    fn compute(&self, ctx: &StageContext<'_>) -> Result<StageOutput, PipelineError> {
        let total = total_carbon_dry_matter(
            ctx.column(columns::CARBON_GAS_DRY_MASS_CUM)?,
            ctx.column(columns::DIC_CUM)?,
            ctx.mask(),
            ctx.seed(),
        );
        let ratio = o2_co2_ratio(
            ctx.column(columns::O2_CONSUMED)?,
            ctx.column(columns::CO2_PRODUCED)?,
            ctx.column(columns::CO2_DISSOLVED_STEP)?,
            ctx.mask(),
            ctx.seed(),
        );

        Ok(vec![(columns::TOTAL_CARBON_DRY_MATTER, total), (columns::RATIO_O2_CO2, ratio)])
    }
}
