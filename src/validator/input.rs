use crate::balance::accumulate::{FLUSHED, NOT_FLUSHED};
use crate::balance::elapsed::{elapsed_days, parse_timestamp};
use crate::columns;
use crate::table::{parse_cell, CellValue, Column, ColumnData, ColumnTable};

use super::{ValidationCheck, ValidationOptions};

/// Classify every cell of a column as a number, empty or invalid
fn numeric_cells(column: &Column) -> Vec<CellValue> {
    match &column.data {
        ColumnData::Float(values) => values
            .iter()
            .map(|&v| if v.is_nan() { CellValue::Empty } else { CellValue::Number(v) })
            .collect(),
        ColumnData::Text(cells) => cells.iter().map(|c| parse_cell(c)).collect(),
    }
}

fn text_cells(table: &ColumnTable, name: &str) -> Option<Vec<String>> {
    let column = table.get(name)?;
    Some((0..table.row_count()).map(|row| column.data.cell_to_string(row)).collect())
}

fn shifted(rows: Vec<usize>, options: &ValidationOptions) -> Vec<usize> {
    rows.into_iter().map(|r| r + options.row_offset).collect()
}

fn format_rows(rows: &[usize]) -> String {
    const SHOWN: usize = 10;
    let mut text: Vec<String> = rows.iter().take(SHOWN).map(|r| r.to_string()).collect();
    if rows.len() > SHOWN {
        text.push(format!("... ({} more)", rows.len() - SHOWN));
    }
    format!("[{}]", text.join(", "))
}

pub(crate) fn check_required_columns(table: &ColumnTable) -> ValidationCheck {
    let missing: Vec<&str> = columns::REQUIRED_INPUTS
        .iter()
        .copied()
        .filter(|c| !table.contains(c))
        .collect();

    if missing.is_empty() {
        ValidationCheck::ok("Required columns present")
    } else {
        ValidationCheck::failed(
            "Required columns present",
            format!("Missing column(s): {}", missing.join(", ")),
        )
    }
}

/// One check per numeric input column other than the flush column
pub(crate) fn check_numeric_columns(table: &ColumnTable, options: &ValidationOptions) -> Vec<ValidationCheck> {
    columns::NUMERIC_INPUTS
        .iter()
        .copied()
        .filter(|&name| name != columns::FLUSH)
        .filter_map(|name| table.get(name).map(|column| (name, column)))
        .map(|(name, column)| {
            let pressure = name == columns::PRESSURE_BEFORE || name == columns::PRESSURE_AFTER;
            let bad: Vec<usize> = numeric_cells(column)
                .iter()
                .enumerate()
                .filter(|(row, cell)| match cell {
                    CellValue::Number(x) => !x.is_finite(),
                    CellValue::Empty => !(pressure && *row == 0),
                    CellValue::Invalid => true,
                })
                .map(|(row, _)| row)
                .collect();

            let check_name = format!("Numeric values in '{}'", name);
            if bad.is_empty() {
                ValidationCheck::ok(check_name)
            } else {
                let rows = shifted(bad, options);
                ValidationCheck::failed(check_name, format!("Empty or non-numeric cells at rows {}", format_rows(&rows)))
                    .at(&[name], rows)
            }
        })
        .collect()
}

pub(crate) fn check_flush_values(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let column = table.get(columns::FLUSH)?;
    let bad: Vec<usize> = numeric_cells(column)
        .iter()
        .enumerate()
        .filter(|(_, cell)| !matches!(cell, CellValue::Number(x) if *x == FLUSHED || *x == NOT_FLUSHED))
        .map(|(row, _)| row)
        .collect();

    let name = "Flush values are 0 or 1";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    Some(
        ValidationCheck::warning(name, format!("Unknown flush value at rows {}", format_rows(&rows)))
            .at(&[columns::FLUSH], rows),
    )
}

pub(crate) fn check_composition_sum(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let gases = [columns::CH4, columns::CO2, columns::O2, columns::N2];
    let cells: Vec<Vec<CellValue>> = gases
        .iter()
        .map(|&g| table.get(g).map(numeric_cells))
        .collect::<Option<_>>()?;

    let bad: Vec<usize> = (0..table.row_count())
        .filter(|&row| {
            let values: Option<Vec<f64>> = cells
                .iter()
                .map(|c| match c[row] {
                    CellValue::Number(x) => Some(x),
                    _ => None,
                })
                .collect();
            values.map_or(false, |v| v.iter().sum::<f64>() == 0.0)
        })
        .collect();

    let name = "Gas composition sums are nonzero";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    Some(
        ValidationCheck::warning(name, format!("Readings sum to zero at rows {}", format_rows(&rows)))
            .at(&gases, rows),
    )
}

pub(crate) fn check_timestamps(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let dates = text_cells(table, columns::DATE)?;
    let times = text_cells(table, columns::TIME).unwrap_or_else(|| vec![String::new(); dates.len()]);

    let bad: Vec<usize> = dates
        .iter()
        .zip(&times)
        .enumerate()
        .filter(|(_, (d, t))| parse_timestamp(d, t, options.day_first).is_none())
        .map(|(row, _)| row)
        .collect();

    let name = "Dates and times parse";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    let mut marked = vec![columns::DATE];
    if table.contains(columns::TIME) {
        marked.push(columns::TIME);
    }
    Some(
        ValidationCheck::warning(name, format!("The following rows have wrong dates {}", format_rows(&rows)))
            .at(&marked, rows),
    )
}

/// Elapsed time from an existing `Day` column, else derived from the dates
pub(crate) fn check_time_order(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let (days, column) = match table.get(columns::DAY).and_then(|c| c.data.as_float()) {
        Some(days) => (days.to_vec(), columns::DAY),
        None => {
            let dates = text_cells(table, columns::DATE)?;
            let times = text_cells(table, columns::TIME).unwrap_or_else(|| vec![String::new(); dates.len()]);
            (elapsed_days(&dates, &times, options.day_first), columns::DATE)
        }
    };

    let mut latest = f64::NEG_INFINITY;
    let mut bad = Vec::new();
    for (row, &day) in days.iter().enumerate() {
        if day.is_nan() {
            continue;
        }
        if day < latest {
            bad.push(row);
        } else {
            latest = day;
        }
    }

    let name = "Elapsed time is non-decreasing";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    Some(
        ValidationCheck::warning(name, format!("Time runs backwards at rows {}", format_rows(&rows)))
            .at(&[column], rows),
    )
}

/// GC method cells must name one of the known methods
pub(crate) fn check_gc_method(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let methods = text_cells(table, columns::GC_METHOD)?;
    let bad: Vec<usize> = methods
        .iter()
        .enumerate()
        .filter(|(_, m)| !columns::GC_METHODS.contains(&m.trim()))
        .map(|(row, _)| row)
        .collect();

    let name = "GC method is known";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    Some(
        ValidationCheck::warning(
            name,
            format!(
                "Expected one of {} at rows {}",
                columns::GC_METHODS.join("/"),
                format_rows(&rows)
            ),
        )
        .at(&[columns::GC_METHOD], rows),
    )
}

/// Flushed rows need a numeric sample weight
pub(crate) fn check_weight_when_flushed(table: &ColumnTable, options: &ValidationOptions) -> Option<ValidationCheck> {
    let weights = numeric_cells(table.get(columns::SAMPLE_WEIGHT)?);
    let flush = numeric_cells(table.get(columns::FLUSH)?);

    let bad: Vec<usize> = flush
        .iter()
        .zip(&weights)
        .enumerate()
        .filter(|(_, (f, w))| {
            matches!(f, CellValue::Number(x) if *x == FLUSHED) && !matches!(w, CellValue::Number(x) if x.is_finite())
        })
        .map(|(row, _)| row)
        .collect();

    let name = "Flushed rows have a weight";
    if bad.is_empty() {
        return Some(ValidationCheck::ok(name));
    }
    let rows = shifted(bad, options);
    Some(
        ValidationCheck::warning(name, format!("No weight on flushed rows {}", format_rows(&rows)))
            .at(&[columns::SAMPLE_WEIGHT], rows),
    )
}
