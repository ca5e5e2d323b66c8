//! Record normalization: value cleaning, column resolution and deduplication

pub mod columns;
pub mod dedup;
pub mod values;

pub use columns::{ColumnMap, Field, Resolution, ResolvedColumns, MIN_CONFIDENCE};
pub use dedup::{
    normalize, Deduplicator, Defaults, NormalizeConfig, NormalizeStats, Normalized, RecordError,
};
pub use values::{clean_date, clean_number, parse_number};
