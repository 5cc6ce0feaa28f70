use crate::balance::FlushIntegrityError;
use crate::constants::ConstantsError;
use crate::table::TableError;

/// Errors that stop a pipeline run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A stage's required input column is absent
    #[error("Stage '{stage}' requires missing column '{column}'")]
    MissingColumn {
        /// Stage that needed the column
        stage: &'static str,
        /// Column header
        column: String,
    },

    /// The constants record failed validation
    #[error(transparent)]
    InvalidConstant(#[from] ConstantsError),

    /// The flush column holds values outside {0, 1} and the policy rejects them
    #[error(transparent)]
    FlushIntegrity(#[from] FlushIntegrityError),

    /// Reading or extending the table failed
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

impl PipelineError {
    pub(crate) fn from_table(stage: &'static str, err: TableError) -> Self {
        match err {
            TableError::MissingColumn(column) => PipelineError::MissingColumn { stage, column },
            other => PipelineError::Table(other),
        }
    }
}
