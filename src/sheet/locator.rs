//! Header row detection
//!
//! Spreadsheets exported by hand carry title blocks, logos and notes above
//! the real column labels, so the header row position is unknown. The
//! locator tries candidate rows top to bottom and scores each by how many
//! expected column-name fragments appear in its labels.
//!
//! # Search order
//!
//! 1. A fixed `header_row` from configuration, when set, is used as-is.
//! 2. Vocabulary scoring: the first candidate whose score reaches the
//!    threshold wins, so a lower row always beats a later, better one.
//! 3. Sentinel scan: when nothing scores high enough, the first candidate
//!    whose leading data rows contain a known sentinel value wins.
//!
//! If all of this fails the locator returns [`LocateError::HeaderNotFound`]
//! rather than guessing.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::grid::{Grid, Row};

/// Column-name fragments expected in the RFQ/PO sheet
pub const DEFAULT_VOCABULARY: [&str; 14] = [
    "TOTAL PO",
    "PRICE/PO",
    "QTY",
    "DATE/PO",
    "PO",
    "CATEGORY",
    "RES.DATE",
    "PRICE/RFQ",
    "DATE/RFQ",
    "RFQ",
    "DESCRIPTION",
    "PART NO",
    "LINE ITEM",
    "UOM",
];

/// Header locator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Column-name fragments to look for (case-insensitive substrings)
    pub vocabulary: Vec<String>,

    /// Minimum number of fragments a header row must contain
    pub threshold: usize,

    /// Number of leading rows tried as header candidates
    pub candidate_rows: usize,

    /// Cell value that identifies the data block when scoring fails
    pub sentinel: Option<String>,

    /// Number of leading rows tried as header candidates during the sentinel scan
    pub sentinel_candidate_rows: usize,

    /// Number of data rows searched for the sentinel under each candidate
    pub sentinel_scan_rows: usize,

    /// Skip detection and use this row as the header
    pub header_row: Option<usize>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            vocabulary: DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            threshold: 8,
            candidate_rows: 20,
            sentinel: Some("LC1D32M7".to_string()),
            sentinel_candidate_rows: 30,
            sentinel_scan_rows: 100,
            header_row: None,
        }
    }
}

/// A grid split into column labels and data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Unique, trimmed column labels
    pub labels: Vec<String>,
    /// Data rows, each exactly `labels.len()` cells wide
    pub rows: Vec<Row>,
}

/// How the header row was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Vocabulary score reached the threshold
    Vocabulary { score: usize },
    /// Sentinel value found in the given data row
    Sentinel { data_row: usize },
    /// Header row taken from configuration
    Fixed,
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detection::Vocabulary { score } => write!(f, "{} matching column(s)", score),
            Detection::Sentinel { data_row } => write!(f, "sentinel in data row {}", data_row),
            Detection::Fixed => write!(f, "configured header row"),
        }
    }
}

/// The chosen table and where it came from
#[derive(Debug, Clone)]
pub struct Located {
    pub header_row: usize,
    pub detection: Detection,
    pub table: Table,
}

/// Build the table obtained by treating `header_row` as the label row.
///
/// Returns `None` when the row is past the end of the grid.
pub fn table_at(grid: &Grid, header_row: usize) -> Option<Table> {
    let header = grid.rows().get(header_row)?;
    let data = &grid.rows()[header_row + 1..];

    let width = data
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);

    let labels = make_labels(header, width);
    let rows = data
        .iter()
        .map(|row| {
            let mut cells = row.clone();
            cells.resize(width, None);
            cells
        })
        .collect();

    Some(Table { labels, rows })
}

/// Trim labels, name blank ones after their column and suffix repeats.
/// Suffixes skip names already taken, so every label is unique.
fn make_labels(header: &Row, width: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();

    (0..width)
        .map(|col| {
            let base = match header.get(col).and_then(|c| c.as_deref()).map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => format!("Unnamed: {}", col),
            };
            let mut label = base.clone();
            while taken.contains(&label) {
                let count = counts.entry(base.clone()).or_insert(0);
                *count += 1;
                label = format!("{}.{}", base, count);
            }
            taken.insert(label.clone());
            label
        })
        .collect()
}

/// Count vocabulary fragments occurring anywhere in the joined labels
pub fn score<S: AsRef<str>>(labels: &[String], vocabulary: &[S]) -> usize {
    let joined = labels
        .iter()
        .map(|l| l.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ");

    vocabulary
        .iter()
        .filter(|fragment| joined.contains(&fragment.as_ref().to_uppercase()))
        .count()
}

/// Finds the header row of a grid
#[derive(Debug, Clone, Default)]
pub struct HeaderLocator {
    config: LocatorConfig,
}

impl HeaderLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn locate(&self, grid: &Grid) -> Result<Located, LocateError> {
        if grid.is_empty() {
            return Err(LocateError::EmptySheet);
        }

        if let Some(row) = self.config.header_row {
            let table = table_at(grid, row).ok_or(LocateError::HeaderRowOutOfRange {
                row,
                height: grid.height(),
            })?;
            return Ok(Located {
                header_row: row,
                detection: Detection::Fixed,
                table,
            });
        }

        let mut best: Option<(usize, usize)> = None;
        for row in 0..self.config.candidate_rows.min(grid.height()) {
            let Some(table) = table_at(grid, row) else {
                break;
            };
            let score = score(&table.labels, &self.config.vocabulary);
            log::debug!("header candidate row {}: {} matching column(s)", row, score);

            if score >= self.config.threshold {
                return Ok(Located {
                    header_row: row,
                    detection: Detection::Vocabulary { score },
                    table,
                });
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((row, score));
            }
        }

        if let Some(located) = self.locate_by_sentinel(grid) {
            return Ok(located);
        }

        Err(LocateError::HeaderNotFound {
            candidates: self.config.candidate_rows.min(grid.height()),
            threshold: self.config.threshold,
            best_row: best.map(|(row, _)| row),
            best_score: best.map_or(0, |(_, score)| score),
        })
    }

    fn locate_by_sentinel(&self, grid: &Grid) -> Option<Located> {
        let sentinel = self.config.sentinel.as_deref().filter(|s| !s.is_empty())?;
        log::debug!(
            "no header row reached {} matches, scanning for '{}'",
            self.config.threshold,
            sentinel
        );

        for row in 0..self.config.sentinel_candidate_rows.min(grid.height()) {
            let table = table_at(grid, row)?;
            let hit = table
                .rows
                .iter()
                .take(self.config.sentinel_scan_rows)
                .position(|data| row_text(data).contains(sentinel));

            if let Some(data_row) = hit {
                log::debug!("found '{}' under header row {}, data row {}", sentinel, row, data_row);
                return Some(Located {
                    header_row: row,
                    detection: Detection::Sentinel { data_row },
                    table,
                });
            }
        }
        None
    }
}

/// Present cell values joined with spaces
fn row_text(row: &Row) -> String {
    row.iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Errors raised while locating the header row
#[derive(Debug, Error, Diagnostic)]
pub enum LocateError {
    #[error("the spreadsheet is empty")]
    #[diagnostic(code(rfqi::locate::empty))]
    EmptySheet,

    #[error("configured header row {row} is outside the sheet ({height} rows)")]
    #[diagnostic(code(rfqi::locate::out_of_range))]
    HeaderRowOutOfRange { row: usize, height: usize },

    #[error(
        "no header row found in the first {candidates} rows (needed {threshold} matching columns, best was {best_score})"
    )]
    #[diagnostic(
        code(rfqi::locate::not_found),
        help("set `locator.header_row` in rfqi.yaml or pass --header-row to pick the row explicitly")
    )]
    HeaderNotFound {
        candidates: usize,
        threshold: usize,
        best_row: Option<usize>,
        best_score: usize,
    },
}
