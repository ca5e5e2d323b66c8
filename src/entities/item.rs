//! Item entity - a part number on a specific line item

use serde::{Deserialize, Serialize};

/// Catalogue entry created once per `part_number` + `line_item`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Synthetic identifier, `IMPORTED_000001` onwards
    pub item_number: String,
    pub part_number: String,
    pub line_item: String,
    pub description: String,
    pub unit_of_measure: String,
    pub category: String,
}

impl Item {
    /// Composite deduplication key
    pub fn key(part_number: &str, line_item: &str) -> String {
        format!("{}_{}", part_number, line_item)
    }

    /// Synthetic item number for the `seq`-th created item (1-based)
    pub fn imported_number(seq: usize) -> String {
        format!("IMPORTED_{:06}", seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_key_joins_with_underscore() {
        assert_eq!(Item::key("A1", "L1"), "A1_L1");
    }

    #[test]
    fn test_imported_number_is_zero_padded() {
        assert_eq!(Item::imported_number(1), "IMPORTED_000001");
        assert_eq!(Item::imported_number(1234567), "IMPORTED_1234567");
    }
}
