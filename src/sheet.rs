//! Tabular reader: spreadsheet worksheets as text grids.
//!
//! Cells are canonicalized to the text a user sees in the spreadsheet, so the
//! transformers only ever deal with `&str`. Coordinates are 0-based and row 0
//! is the header row of the used range.

use crate::error::{ConnectorError, ConnectorResult};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::Timelike;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Used range of one worksheet, as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    name: String,
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Grid {
    /// Build a grid from a calamine range.
    pub fn from_range(name: &str, range: &Range<Data>) -> ConnectorResult<Self> {
        if range.is_empty() {
            return Err(ConnectorError::SourceFormat(format!(
                "worksheet '{}' has no used range",
                name
            )));
        }
        let rows = range
            .rows()
            .map(|row| row.iter().map(canonical_text).collect())
            .collect();
        Ok(Self::new(name, rows))
    }

    /// Build a grid from text rows; the first row is the header.
    pub fn from_rows<S: AsRef<str>>(name: &str, rows: &[Vec<S>]) -> ConnectorResult<Self> {
        if rows.is_empty() || rows.iter().all(|r| r.iter().all(|c| c.as_ref().is_empty())) {
            return Err(ConnectorError::SourceFormat(format!(
                "worksheet '{}' has no used range",
                name
            )));
        }
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect())
            .collect();
        Ok(Self::new(name, rows))
    }

    fn new(name: &str, rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Grid {
            name: name.to_string(),
            rows,
            width,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows including the header
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell text, `""` outside the used range or for blank cells.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Header label of a column
    pub fn header(&self, col: usize) -> &str {
        self.cell(0, col)
    }

    /// Indices of the data rows (everything below the header)
    pub fn data_rows(&self) -> std::ops::Range<usize> {
        1..self.height()
    }
}

/// Canonical text of a cell value.
pub fn canonical_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => date_text(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `2024-01-31`, or `2024-01-31 14:30:00` when the cell has a time of day.
/// Durations keep their serial number.
fn date_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt.as_f64().to_string();
    }
    match dt.as_datetime() {
        Some(value) if value.num_seconds_from_midnight() == 0 => {
            value.format("%Y-%m-%d").to_string()
        }
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.as_f64().to_string(),
    }
}

/// An opened spreadsheet file.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open<P: AsRef<Path>>(path: P) -> ConnectorResult<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path)?;
        Ok(Workbook { path, sheets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn grid(&mut self, sheet_name: &str) -> ConnectorResult<Grid> {
        let range = self.sheets.worksheet_range(sheet_name)?;
        Grid::from_range(sheet_name, &range)
    }

    /// All worksheets in workbook order.
    pub fn grids(&mut self) -> ConnectorResult<Vec<Grid>> {
        self.sheet_names()
            .iter()
            .map(|name| self.grid(name))
            .collect()
    }

    pub fn first_grid(&mut self) -> ConnectorResult<Grid> {
        let first = self.sheet_names().into_iter().next().ok_or_else(|| {
            ConnectorError::SourceFormat(format!("{} has no worksheets", self.path.display()))
        })?;
        self.grid(&first)
    }
}
