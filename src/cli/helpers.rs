//! Shared helper functions for CLI commands

use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::normalize::ResolvedColumns;
use crate::sheet::Record;

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes; cell text is often Arabic.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Render label/count pairs as a two-column table
pub fn count_table(title: &str, rows: &[(&str, usize)]) -> String {
    let mut table = Builder::default();
    table.push_record([title, "Count"]);
    for (label, count) in rows {
        table.push_record([label.to_string(), count.to_string()]);
    }
    table.build().with(Style::rounded()).to_string()
}

/// Print the non-empty values of a record, one per line
pub fn print_sample(record: &Record) {
    println!("{}", style("Sample record").bold());
    for (key, value) in record {
        if let Some(value) = value {
            println!("  {}: {}", style(key).dim(), truncate_str(value, 60));
        }
    }
}

/// Print which record key each logical field was read from
pub fn print_columns(columns: &ResolvedColumns) {
    println!(
        "{} Columns resolved: {}%",
        style("→").blue(),
        columns.coverage()
    );
    for (field, resolution) in columns.iter() {
        if resolution.confidence < 100 {
            println!(
                "  {} {} ← \"{}\" ({}%)",
                style("~").yellow(),
                field,
                resolution.key,
                resolution.confidence
            );
        }
    }
}
