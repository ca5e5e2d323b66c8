//! Date and number coercion for raw cell text

use chrono::NaiveDate;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Saudi riyal marker found in price cells
const RIYAL_MARKER: &str = "ر.س";

fn is_missing(text: &str) -> bool {
    text.is_empty() || text.eq_ignore_ascii_case("nan")
}

/// Parse a date cell into `YYYY-MM-DD`.
///
/// Any time-of-day part after the first space is ignored. Returns `None`
/// for blank cells, `nan`, and text matching none of the known layouts.
pub fn clean_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return None;
    }

    let date_part = trimmed.split(' ').next().unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Parse a quantity or price cell, tolerating thousands separators and
/// currency markers. Returns `None` when the cell is blank or unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_missing(trimmed) {
        return None;
    }

    trimmed
        .replace(',', "")
        .replace('$', "")
        .replace(RIYAL_MARKER, "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Like [`parse_number`], reading blank and unparseable cells as zero
pub fn clean_number(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}
