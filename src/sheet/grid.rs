//! Raw cell grids loaded from workbooks and CSV files
//!
//! A [`Grid`] is the untyped view of the first worksheet: every cell is
//! rendered to text up front, and empty cells are `None`. Header detection
//! and record extraction work on this representation only.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, TimeDelta};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One grid row. Cells are `None` when empty.
pub type Row = Vec<Option<String>>;

/// Rows of a single worksheet, top to bottom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Row>,
}

impl Grid {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a grid from plain text rows; empty strings become empty cells
    pub fn from_text_rows(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Load the first worksheet of a spreadsheet, dispatching on extension
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::from_csv(path),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::from_workbook(path),
            _ => Err(SheetError::Unsupported {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    fn from_workbook(path: &Path) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetError::NoWorksheet(path.to_path_buf()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Workbook {
                path: path.to_path_buf(),
                message: format!("failed to read sheet '{}': {}", sheet_name, e),
            })?;

        // The range starts at the first used cell; keep leading blank rows so
        // row indices line up with the worksheet.
        let leading = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut rows: Vec<Row> = vec![Vec::new(); leading];
        rows.extend(range.rows().map(|r| r.iter().map(cell_text).collect::<Row>()));

        log::debug!(
            "loaded sheet '{}' from {} ({} rows)",
            sheet_name,
            path.display(),
            rows.len()
        );
        Ok(Self::new(rows))
    }

    fn from_csv(path: &Path) -> Result<Self, SheetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(
                record
                    .iter()
                    .map(|field| (!field.is_empty()).then(|| field.to_string()))
                    .collect(),
            );
        }

        log::debug!("loaded {} rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }
}

/// Render a workbook cell as text
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_float(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) if dt.is_duration() => Some(format_float(dt.as_f64())),
        Data::DateTime(dt) => Some(
            excel_serial_to_datetime(dt.as_f64()).unwrap_or_else(|| format_float(dt.as_f64())),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Whole floats print without a fractional part (part numbers, quantities)
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Excel serial dates count days from 1899-12-30
fn excel_serial_to_datetime(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    let datetime = epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Errors raised while loading a spreadsheet
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unsupported spreadsheet type '{extension}' for {path:?}")]
    Unsupported { path: PathBuf, extension: String },

    #[error("failed to open workbook {path:?}: {message}")]
    Workbook { path: PathBuf, message: String },

    #[error("workbook {0:?} has no worksheets")]
    NoWorksheet(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
