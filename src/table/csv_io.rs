//! CSV rendition of a spreadsheet range.
//!
//! Measurement sheets carry a block of free-form notes above the data, so a
//! table is read from a [`TableRegion`]: the header record at `header_row`
//! and every record below it, restricted to a span of columns. Writing is
//! the mirror image: the table is placed with its header at an [`Anchor`]
//! cell and the cells above and left of it are left empty.
//!
//! Rows are counted in CSV records. Completely empty lines are not records
//! and are skipped by the reader; padding written by [`write_table`] always
//! holds at least one (empty) field so it round-trips.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{column_letters, parse_cell, CellValue, ColumnData, ColumnTable, TableError};

/// Rectangular region of a CSV grid holding one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegion {
    /// 0-based record index of the header row
    pub header_row: usize,
    /// 0-based index of the first column of the table
    pub first_column: usize,
    /// 0-based index of the last column (inclusive); `None` reads to the
    /// last non-empty header cell
    pub last_column: Option<usize>,
}

impl TableRegion {
    /// Region whose header sits at the given record and column
    pub fn new(header_row: usize, first_column: usize) -> Self {
        Self {
            header_row,
            first_column,
            last_column: None,
        }
    }

    /// Restrict the region to end at `last_column` (inclusive)
    pub fn with_last_column(mut self, last_column: usize) -> Self {
        self.last_column = Some(last_column);
        self
    }
}

/// Top-left cell where a written table's header starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// 0-based record index of the header row
    pub row: usize,
    /// 0-based column index of the first column
    pub column: usize,
}

impl Anchor {
    /// The region that reads back a table written at this anchor
    pub fn region(&self) -> TableRegion {
        TableRegion::new(self.row, self.column)
    }
}

/// Load a table from a CSV file
pub fn read_table_file<P: AsRef<Path>>(path: P, region: &TableRegion) -> Result<ColumnTable, TableError> {
    let file = File::open(path)?;
    read_table(BufReader::new(file), region)
}

/// Load the table in `region` from CSV data.
///
/// A column is numeric when every non-empty cell parses as a number,
/// otherwise it is kept as text. Trailing rows that are empty across the
/// whole span are dropped.
pub fn read_table<R: Read>(reader: R, region: &TableRegion) -> Result<ColumnTable, TableError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records().skip(region.header_row);

    let header = match records.next() {
        Some(record) => record?,
        None => {
            return Err(TableError::InvalidRegion(format!(
                "no header record at row {}",
                region.header_row
            )))
        }
    };

    let last_column = match region.last_column {
        Some(last) => last,
        None => header
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.trim().is_empty())
            .last()
            .map(|(idx, _)| idx)
            .ok_or_else(|| TableError::InvalidRegion("header row is empty".to_string()))?,
    };

    if last_column < region.first_column {
        return Err(TableError::InvalidRegion(format!(
            "last column {} lies before first column {}",
            column_letters(last_column),
            column_letters(region.first_column)
        )));
    }

    let span = region.first_column..=last_column;
    let names: Vec<String> = span
        .clone()
        .map(|idx| {
            let name = header.get(idx).map(str::trim).unwrap_or_default();
            if name.is_empty() {
                format!("Column {}", column_letters(idx))
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in records {
        let record = record?;
        for (slot, idx) in cells.iter_mut().zip(span.clone()) {
            slot.push(record.get(idx).map(str::trim).unwrap_or_default().to_string());
        }
    }

    // Drop trailing rows that are blank across the span
    let mut rows = cells.first().map(Vec::len).unwrap_or(0);
    while rows > 0 && cells.iter().all(|col| col[rows - 1].is_empty()) {
        rows -= 1;
    }
    for col in &mut cells {
        col.truncate(rows);
    }

    let mut table = ColumnTable::new();
    for (name, col) in names.into_iter().zip(cells) {
        table.push_column(name, infer_column(col))?;
    }

    debug!(
        "Loaded table: {} columns x {} rows from record {}",
        table.column_count(),
        table.row_count(),
        region.header_row
    );

    Ok(table)
}

fn infer_column(cells: Vec<String>) -> ColumnData {
    let mut values = Vec::with_capacity(cells.len());
    for cell in &cells {
        match parse_cell(cell) {
            CellValue::Number(x) => values.push(x),
            CellValue::Empty => values.push(f64::NAN),
            CellValue::Invalid => return ColumnData::Text(cells),
        }
    }
    ColumnData::Float(values)
}

/// Write a table to a CSV file at the given anchor
pub fn write_table_file<P: AsRef<Path>>(path: P, table: &ColumnTable, anchor: Anchor) -> Result<(), TableError> {
    let file = File::create(path)?;
    write_table(BufWriter::new(file), table, anchor)
}

/// Write a table as CSV with its header at `anchor`.
///
/// Undefined values are written as empty cells.
pub fn write_table<W: Write>(writer: W, table: &ColumnTable, anchor: Anchor) -> Result<(), TableError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    let width = anchor.column + table.column_count().max(1);
    let padding = vec![String::new(); width];
    for _ in 0..anchor.row {
        csv_writer.write_record(&padding)?;
    }

    let lead = vec![String::new(); anchor.column];

    let mut header = lead.clone();
    header.extend(table.column_names().map(str::to_string));
    csv_writer.write_record(&header)?;

    for row in 0..table.row_count() {
        let mut record = lead.clone();
        record.extend(table.columns().iter().map(|c| c.data.cell_to_string(row)));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
