use std::collections::HashSet;
use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Dataset};

/// Source formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Guesses the format from the file extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Reads the first table of a CSV or spreadsheet file into a [`Dataset`].
///
/// The first row is the header. Header names are made unique and empty ones
/// replaced, so downstream code can address columns by name.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let format =
        SourceFormat::detect(path).ok_or_else(|| ToolError::UnsupportedInput(path.to_path_buf()))?;
    let grid = match format {
        SourceFormat::Csv => read_csv_grid(path)?,
        SourceFormat::Spreadsheet => read_spreadsheet_grid(path)?,
    };
    dataset_from_grid(grid)
}

/// Builds a dataset from decoded header cells and rows.
pub fn dataset_from_grid(mut grid: Vec<Vec<SourceCell>>) -> Result<Dataset> {
    if grid.is_empty() {
        return Err(ToolError::EmptyDataset("no header row".into()));
    }
    let header = grid.remove(0);
    let columns = unique_headers(header.iter().map(SourceCell::header_text));

    let rows: Vec<Vec<CellValue>> = grid
        .into_iter()
        .map(|row| row.into_iter().map(SourceCell::into_value).collect::<Vec<_>>())
        .collect();
    let rows = trim_trailing_blank_rows(rows);

    debug!(columns = columns.len(), rows = rows.len(), "decoded source table");
    Dataset::new(columns, rows)
}

/// A decoded source cell. Date-typed cells are kept apart so header dates
/// can be rendered as `MM/DD/YYYY` column names.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCell {
    Value(CellValue),
    /// A date-typed cell.
    Date(NaiveDate),
}

impl SourceCell {
    fn header_text(&self) -> String {
        match self {
            SourceCell::Value(value) => value.to_text(),
            SourceCell::Date(date) => date.format("%m/%d/%Y").to_string(),
        }
    }

    fn into_value(self) -> CellValue {
        match self {
            SourceCell::Value(value) => value,
            SourceCell::Date(date) => CellValue::Text(date.format("%m/%d/%Y").to_string()),
        }
    }
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<SourceCell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|field| SourceCell::Value(CellValue::from_text(field)))
                .collect(),
        );
    }
    Ok(grid)
}

fn read_spreadsheet_grid(path: &Path) -> Result<Vec<Vec<SourceCell>>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::EmptyDataset("workbook has no worksheets".into()))??;

    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(cell: &DataType) -> SourceCell {
    let value = match cell {
        DataType::Empty => CellValue::Empty,
        DataType::String(value) => CellValue::from_text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Text(value.to_string()),
        DataType::DateTime(serial) => {
            return match excel_serial_to_date(*serial) {
                Some(date) => SourceCell::Date(date),
                None => SourceCell::Value(CellValue::Number(*serial)),
            };
        }
        DataType::Error(_) => CellValue::Empty,
        other => CellValue::from_text(other.to_string()),
    };
    SourceCell::Value(value)
}

/// Converts an Excel 1900-system serial day number to a calendar date.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..3_000_000.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Replaces empty names with `Unnamed_{n}` and suffixes duplicates `_1`, `_2`, ...
fn unique_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let raw: Vec<String> = raw
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                format!("Unnamed_{}", idx + 1)
            } else {
                name
            }
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut columns = Vec::with_capacity(raw.len());
    for name in raw {
        let mut candidate = name.clone();
        let mut counter = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}_{counter}");
            counter += 1;
        }
        seen.insert(candidate.clone());
        columns.push(candidate);
    }
    columns
}

fn trim_trailing_blank_rows(mut rows: Vec<Vec<CellValue>>) -> Vec<Vec<CellValue>> {
    while rows
        .last()
        .is_some_and(|row| row.iter().all(CellValue::is_blank))
    {
        rows.pop();
    }
    rows
}
