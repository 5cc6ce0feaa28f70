//! # Column Table
//!
//! An ordered, named-column table holding one sample's measurement series.
//! Columns are either floating point (undefined cells are `NaN`) or text
//! (dates and times as they appear in the sheet). Pipeline stages read
//! columns by name and the driver appends the columns they return, so the
//! table only ever grows during a run.
//!
//! The [`csv_io`] submodule loads a rectangular region of a CSV grid into a
//! table and writes a table back at an anchor cell; [`address`] converts
//! spreadsheet column letters; [`series`] is the typed row model.

pub mod address;
pub mod csv_io;
mod error;
pub mod series;


pub use address::{column_index, column_letters};
pub use csv_io::{read_table, read_table_file, write_table, write_table_file, Anchor, TableRegion};
pub use error::TableError;
pub use series::{SampleRow, SampleSeries};

/// Cell storage for one column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Numeric cells; `NaN` marks an undefined value
    Float(Vec<f64>),
    /// Text cells; an empty string marks an empty cell
    Text(Vec<String>),
}

impl ColumnData {
    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    /// True when the column holds no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric cells, if this is a float column
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    /// Text cells, if this is a text column
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ColumnData::Text(v) => Some(v),
            ColumnData::Float(_) => None,
        }
    }

    /// Render one cell the way it is written to CSV.
    ///
    /// `NaN` renders as an empty cell; finite floats use the shortest
    /// representation that parses back to the same value.
    pub fn cell_to_string(&self, row: usize) -> String {
        match self {
            ColumnData::Float(v) => match v.get(row) {
                Some(x) if !x.is_nan() => format!("{}", x),
                _ => String::new(),
            },
            ColumnData::Text(v) => v.get(row).cloned().unwrap_or_default(),
        }
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header text
    pub name: String,
    /// Cells
    pub data: ColumnData,
}

/// Ordered collection of equally long named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    columns: Vec<Column>,
    rows: usize,
}

impl ColumnTable {
    /// Create an empty table; the first pushed column fixes the row count
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column headers in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether a column with this header exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up a column by header
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Numeric cells of a float column
    pub fn float(&self, name: &str) -> Result<&[f64], TableError> {
        let column = self
            .get(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        column.data.as_float().ok_or_else(|| TableError::WrongKind {
            name: name.to_string(),
            expected: "float",
        })
    }

    /// Text cells of a text column
    pub fn text(&self, name: &str) -> Result<&[String], TableError> {
        let column = self
            .get(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        column.data.as_text().ok_or_else(|| TableError::WrongKind {
            name: name.to_string(),
            expected: "text",
        })
    }

    /// Append a column. Fails on a duplicate header or a length mismatch.
    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<(), TableError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        self.check_len(&name, &data)?;
        if self.columns.is_empty() {
            self.rows = data.len();
        }
        self.columns.push(Column { name, data });
        Ok(())
    }

    /// Replace a column in place, or append it if absent.
    pub fn set_column(&mut self, name: impl Into<String>, data: ColumnData) -> Result<(), TableError> {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => {
                self.check_len(&name, &data)?;
                self.columns[idx].data = data;
                Ok(())
            }
            None => self.push_column(name, data),
        }
    }

    fn check_len(&self, name: &str, data: &ColumnData) -> Result<(), TableError> {
        if !self.columns.is_empty() && data.len() != self.rows {
            return Err(TableError::LengthMismatch {
                name: name.to_string(),
                len: data.len(),
                rows: self.rows,
            });
        }
        Ok(())
    }

    /// Convert a text column to a float column in place.
    ///
    /// Empty cells become `NaN`. Non-empty cells that do not parse also
    /// become `NaN`; their row indexes are returned. A column that is
    /// already numeric is left untouched and yields no rows.
    pub fn coerce_float(&mut self, name: &str) -> Result<Vec<usize>, TableError> {
        let idx = self
            .position(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;

        let ColumnData::Text(cells) = &self.columns[idx].data else {
            return Ok(Vec::new());
        };

        let mut invalid = Vec::new();
        let values = cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match parse_cell(cell) {
                CellValue::Number(x) => x,
                CellValue::Empty => f64::NAN,
                CellValue::Invalid => {
                    invalid.push(row);
                    f64::NAN
                }
            })
            .collect();

        self.columns[idx].data = ColumnData::Float(values);
        Ok(invalid)
    }

    /// Number of undefined (`NaN`) cells in a float column
    pub fn nan_count(&self, name: &str) -> Result<usize, TableError> {
        Ok(self.float(name)?.iter().filter(|v| v.is_nan()).count())
    }
}

/// Classification of a single text cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Blank cell
    Empty,
    /// Parsed number
    Number(f64),
    /// Non-empty cell that is not a number
    Invalid,
}

/// Parse one cell. A lone decimal comma (`"21,9"`) is accepted.
///
/// A comma followed by exactly three digits (`"1,013"`) reads equally well
/// as a thousands separator and is rejected as [`CellValue::Invalid`].
pub fn parse_cell(cell: &str) -> CellValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(x) = cell.parse::<f64>() {
        return CellValue::Number(x);
    }
    if !cell.contains('.') && cell.matches(',').count() == 1 {
        let fraction = cell.rsplit(',').next().unwrap_or_default();
        if fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit()) {
            return CellValue::Invalid;
        }
        if let Ok(x) = cell.replace(',', ".").parse::<f64>() {
            return CellValue::Number(x);
        }
    }
    CellValue::Invalid
}
