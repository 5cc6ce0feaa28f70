/// Errors that can occur while building, loading or writing a column table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error reading or writing a table file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A requested column is not in the table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column holds text where numbers were expected (or the reverse)
    #[error("Column '{name}' is not a {expected} column")]
    WrongKind {
        /// Column name
        name: String,
        /// Expected kind ("float" or "text")
        expected: &'static str,
    },

    /// A column was added whose length differs from the table's row count
    #[error("Column '{name}' has {len} rows, table has {rows}")]
    LengthMismatch {
        /// Column name
        name: String,
        /// Length of the rejected column
        len: usize,
        /// Row count of the table
        rows: usize,
    },

    /// Two columns share a header
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// The header row of the selected region is missing or empty
    #[error("Invalid table region: {0}")]
    InvalidRegion(String),

    /// A spreadsheet column address could not be parsed
    #[error("Invalid column address: {0}")]
    InvalidAddress(String),
}
