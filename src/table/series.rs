//! Typed row model for a sample's measurement series.
//!
//! Useful for building input tables in code (demo data, tests) and for
//! reading the raw inputs back out of a loaded table.

use serde::{Deserialize, Serialize};

use super::{ColumnData, ColumnTable, TableError};
use crate::columns;

/// One measurement event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    /// Sampling date as written in the sheet
    pub date: String,
    /// Sampling time of day as written in the sheet
    pub time: String,
    /// Days since the first row, when known
    pub day: Option<f64>,
    /// Raw methane [%]
    pub ch4: f64,
    /// Raw carbon dioxide [%]
    pub co2: f64,
    /// Raw oxygen [%]
    pub o2: f64,
    /// Raw nitrogen [%]
    pub n2: f64,
    /// Pressure before sampling [hPa]
    pub pressure_before: f64,
    /// Pressure after sampling [hPa]
    pub pressure_after: f64,
    /// Flush indicator as recorded (expected 0 or 1)
    pub flush: f64,
}

impl SampleRow {
    /// Row with the given gas readings and pressures, not flushed
    pub fn new(ch4: f64, co2: f64, o2: f64, n2: f64, pressure_before: f64, pressure_after: f64) -> Self {
        Self {
            ch4,
            co2,
            o2,
            n2,
            pressure_before,
            pressure_after,
            ..Default::default()
        }
    }

    /// Set the sampling timestamp text
    pub fn at(mut self, date: impl Into<String>, time: impl Into<String>) -> Self {
        self.date = date.into();
        self.time = time.into();
        self
    }

    /// Set the elapsed time directly
    pub fn on_day(mut self, day: f64) -> Self {
        self.day = Some(day);
        self
    }

    /// Mark the row as flushed
    pub fn flushed(mut self) -> Self {
        self.flush = 1.0;
        self
    }
}

/// Ordered sequence of measurement events for one sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    /// Rows in sampling order
    pub rows: Vec<SampleRow>,
}

impl SampleSeries {
    /// Wrap rows in sampling order
    pub fn new(rows: Vec<SampleRow>) -> Self {
        Self { rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lay the rows out as an input table under the standard column names.
    ///
    /// Date and time columns are only emitted when at least one row has a
    /// timestamp, the day column only when at least one row has a day.
    pub fn to_table(&self) -> Result<ColumnTable, TableError> {
        let mut table = ColumnTable::new();
        let has_timestamps = self.rows.iter().any(|r| !r.date.is_empty());
        let has_days = self.rows.iter().any(|r| r.day.is_some());

        if has_timestamps {
            table.push_column(columns::DATE, ColumnData::Text(self.rows.iter().map(|r| r.date.clone()).collect()))?;
            table.push_column(columns::TIME, ColumnData::Text(self.rows.iter().map(|r| r.time.clone()).collect()))?;
        }
        if has_days {
            table.push_column(columns::DAY, self.floats(|r| r.day.unwrap_or(f64::NAN)))?;
        }
        table.push_column(columns::CH4, self.floats(|r| r.ch4))?;
        table.push_column(columns::CO2, self.floats(|r| r.co2))?;
        table.push_column(columns::O2, self.floats(|r| r.o2))?;
        table.push_column(columns::N2, self.floats(|r| r.n2))?;
        table.push_column(columns::PRESSURE_BEFORE, self.floats(|r| r.pressure_before))?;
        table.push_column(columns::PRESSURE_AFTER, self.floats(|r| r.pressure_after))?;
        table.push_column(columns::FLUSH, self.floats(|r| r.flush))?;

        Ok(table)
    }

    fn floats(&self, f: impl Fn(&SampleRow) -> f64) -> ColumnData {
        ColumnData::Float(self.rows.iter().map(f).collect())
    }

    /// Read the raw inputs back out of a table.
    ///
    /// The numeric input columns are required; date, time and day are
    /// optional.
    pub fn from_table(table: &ColumnTable) -> Result<Self, TableError> {
        let ch4 = table.float(columns::CH4)?;
        let co2 = table.float(columns::CO2)?;
        let o2 = table.float(columns::O2)?;
        let n2 = table.float(columns::N2)?;
        let p_before = table.float(columns::PRESSURE_BEFORE)?;
        let p_after = table.float(columns::PRESSURE_AFTER)?;
        let flush = table.float(columns::FLUSH)?;

        let text = |name: &str, row: usize| {
            table
                .get(name)
                .map(|c| c.data.cell_to_string(row))
                .unwrap_or_default()
        };

        let days = table.get(columns::DAY).and_then(|c| c.data.as_float());

        let rows = (0..table.row_count())
            .map(|i| SampleRow {
                date: text(columns::DATE, i),
                time: text(columns::TIME, i),
                day: days.map(|d| d[i]).filter(|d| !d.is_nan()),
                ch4: ch4[i],
                co2: co2[i],
                o2: o2[i],
                n2: n2[i],
                pressure_before: p_before[i],
                pressure_after: p_after[i],
                flush: flush[i],
            })
            .collect();

        Ok(Self { rows })
    }
}
