// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeriesError};

/// One dated observation. `values` lines up with the owning table's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl SeriesRow {
    pub fn new(date: NaiveDate, values: Vec<f64>) -> Self {
        SeriesRow { date, values }
    }
}

/// A row flattened for serialization: the date plus one entry per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Date-keyed table of numeric columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeriesTable {
    columns: Vec<String>,
    rows: Vec<SeriesRow>,
}

impl TimeSeriesTable {
    pub fn new(columns: Vec<String>) -> Self {
        TimeSeriesTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table, checking that every row carries one value per column.
    pub fn from_rows(columns: Vec<String>, rows: Vec<SeriesRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(SeriesError::invalid_argument(format!(
                "row {} has {} values, expected {}",
                bad.date,
                bad.values.len(),
                columns.len()
            )));
        }
        Ok(TimeSeriesTable { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| SeriesError::not_found(format!("column '{}'", name)))
    }

    /// Values of a single column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub(crate) fn push_row(&mut self, row: SeriesRow) {
        debug_assert_eq!(row.values.len(), self.columns.len());
        self.rows.push(row);
    }

    pub(crate) fn with_rows(&self, rows: Vec<SeriesRow>) -> Self {
        TimeSeriesTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Stable sort ascending by date.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.date);
    }

    pub fn is_sorted(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].date < w[1].date)
    }

    /// Table view: one record per row with named values.
    pub fn records(&self) -> Vec<SeriesRecord> {
        self.rows
            .iter()
            .map(|row| SeriesRecord {
                date: row.date,
                values: self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.values.iter().copied())
                    .collect(),
            })
            .collect()
    }

    /// Array view: the date axis and a dense row-major value matrix.
    pub fn to_matrix(&self) -> (Vec<NaiveDate>, Vec<Vec<f64>>) {
        let dates = self.dates();
        let values = self.rows.iter().map(|r| r.values.clone()).collect();
        (dates, values)
    }
}

/// Inclusive date bounds used to clip a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SeriesError::invalid_argument(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Window { start, end })
    }

    /// Clipping only applies when both bounds are given.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<Self>> {
        match (start, end) {
            (Some(start), Some(end)) => Window::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Target period length for resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cadence {
    #[default]
    None,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Cadence {
    pub const ALL: [Cadence; 5] = [
        Cadence::None,
        Cadence::Weekly,
        Cadence::Monthly,
        Cadence::Quarterly,
        Cadence::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::None => "default",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
            Cadence::Quarterly => "quarterly",
            Cadence::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "none" => Ok(Cadence::None),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            "quarterly" => Ok(Cadence::Quarterly),
            "yearly" => Ok(Cadence::Yearly),
            other => Err(SeriesError::invalid_argument(format!(
                "cadence '{}'; allowed values are 'weekly', 'monthly', 'quarterly', 'yearly' and 'default'",
                other
            ))),
        }
    }
}
