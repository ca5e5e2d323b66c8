//! Spreadsheet loading, header detection and record extraction

pub mod grid;
pub mod locator;
pub mod records;

pub use grid::{Grid, Row, SheetError};
pub use locator::{
    score, table_at, Detection, HeaderLocator, LocateError, Located, LocatorConfig, Table,
    DEFAULT_VOCABULARY,
};
pub use records::{extract_records, records_from_json, Record};
