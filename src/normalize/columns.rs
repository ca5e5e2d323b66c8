//! Column resolution: which record key holds which logical field
//!
//! The defaults are the literal labels of the RFQ/PO sheet, misspellings
//! included. When a configured label is missing from the records, the
//! resolver falls back to matching known aliases against the labels that
//! are present.
//!
//! # Confidence
//!
//! | Match                               | Score |
//! |-------------------------------------|-------|
//! | exact                               | 100   |
//! | case-insensitive                    | 95    |
//! | label contains alias                | 80    |
//! | alias contains label                | 70    |
//!
//! Anything under [`MIN_CONFIDENCE`] is left unresolved.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sheet::Record;

/// Lowest score accepted by alias matching
pub const MIN_CONFIDENCE: u8 = 70;

/// Logical fields read by the deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PartNumber,
    LineItem,
    Description,
    UnitOfMeasure,
    Category,
    RfqNumber,
    RfqDate,
    RfqQuantity,
    RfqPrice,
    PoNumber,
    PoDate,
    PoQuantity,
    PoPrice,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::PartNumber,
        Field::LineItem,
        Field::Description,
        Field::UnitOfMeasure,
        Field::Category,
        Field::RfqNumber,
        Field::RfqDate,
        Field::RfqQuantity,
        Field::RfqPrice,
        Field::PoNumber,
        Field::PoDate,
        Field::PoQuantity,
        Field::PoPrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PartNumber => "part_number",
            Field::LineItem => "line_item",
            Field::Description => "description",
            Field::UnitOfMeasure => "unit_of_measure",
            Field::Category => "category",
            Field::RfqNumber => "rfq_number",
            Field::RfqDate => "rfq_date",
            Field::RfqQuantity => "rfq_quantity",
            Field::RfqPrice => "rfq_price",
            Field::PoNumber => "po_number",
            Field::PoDate => "po_date",
            Field::PoQuantity => "po_quantity",
            Field::PoPrice => "po_price",
        }
    }

    /// Alternative labels seen in other exports
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::PartNumber => &["PART NO", "PART NUMBER", "PARTNO", "P/N"],
            Field::LineItem => &["LINE ITEM", "LINEITEM", "ITEM NO"],
            Field::Description => &["DESCRIPTION", "DESCREPTION", "DESC"],
            Field::UnitOfMeasure => &["UOM", "UNIT"],
            Field::Category => &["CATEGORY", "CATOGRY"],
            Field::RfqNumber => &["RFQ", "RFQ NO", "RFQ NUMBER"],
            Field::RfqDate => &["DATE/RFQ", "RFQ DATE", "REQUEST DATE"],
            Field::RfqQuantity => &["QTY", "QUANTITY"],
            Field::RfqPrice => &["PRICE/RFQ", "UNIT PRICE"],
            Field::PoNumber => &["PO NUMBER", "PO NO"],
            Field::PoDate => &["DATE/PO", "DATE /PO", "PO DATE"],
            Field::PoQuantity => &["QUANTITY/PO", "QTY/PO", "PO QTY"],
            Field::PoPrice => &["PRICE/PO", "PO PRICE"],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record keys for each logical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub part_number: String,
    pub line_item: String,
    pub description: String,
    pub unit_of_measure: String,
    pub category: String,
    pub rfq_number: String,
    pub rfq_date: String,
    pub rfq_quantity: String,
    pub rfq_price: String,
    pub po_number: String,
    pub po_date: String,
    pub po_quantity: String,
    pub po_price: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            part_number: "PART NO".to_string(),
            line_item: "LINE ITEM".to_string(),
            description: "DESCREPTION".to_string(),
            unit_of_measure: "UOM".to_string(),
            category: "Catogry".to_string(),
            rfq_number: "RFQ".to_string(),
            rfq_date: "DATE/RFQ".to_string(),
            rfq_quantity: "QTY".to_string(),
            rfq_price: "PRICE/RFQ".to_string(),
            po_number: "PO".to_string(),
            po_date: "DATE /PO".to_string(),
            po_quantity: "Quantity/PO".to_string(),
            po_price: "PRICE/PO".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn key(&self, field: Field) -> &str {
        match field {
            Field::PartNumber => &self.part_number,
            Field::LineItem => &self.line_item,
            Field::Description => &self.description,
            Field::UnitOfMeasure => &self.unit_of_measure,
            Field::Category => &self.category,
            Field::RfqNumber => &self.rfq_number,
            Field::RfqDate => &self.rfq_date,
            Field::RfqQuantity => &self.rfq_quantity,
            Field::RfqPrice => &self.rfq_price,
            Field::PoNumber => &self.po_number,
            Field::PoDate => &self.po_date,
            Field::PoQuantity => &self.po_quantity,
            Field::PoPrice => &self.po_price,
        }
    }
}

/// A field bound to a concrete record key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    pub confidence: u8,
}

/// Field bindings for one batch of records
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    resolved: IndexMap<Field, Resolution>,
}

impl ResolvedColumns {
    /// Bind every field against the keys observed in `records`
    pub fn resolve(map: &ColumnMap, records: &[Record]) -> Self {
        let mut observed: Vec<&str> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !observed.contains(&key.as_str()) {
                    observed.push(key);
                }
            }
        }

        // Exact keys are claimed first so aliases cannot steal them
        let mut claimed: Vec<&str> = Field::ALL
            .iter()
            .map(|f| map.key(*f))
            .filter(|key| observed.contains(key))
            .collect();

        let mut resolved = IndexMap::new();
        for field in Field::ALL {
            let configured = map.key(field);
            let resolution = if observed.contains(&configured) {
                Some(Resolution {
                    key: configured.to_string(),
                    confidence: 100,
                })
            } else {
                let free: Vec<&str> = observed
                    .iter()
                    .copied()
                    .filter(|key| !claimed.contains(key))
                    .collect();
                best_alias_match(field, configured, &free)
            };

            match resolution {
                Some(r) => {
                    log::debug!("column {} -> '{}' ({}%)", field, r.key, r.confidence);
                    if let Some(key) = observed.iter().copied().find(|k| *k == r.key) {
                        claimed.push(key);
                    }
                    resolved.insert(field, r);
                }
                None => log::debug!("column {} unresolved", field),
            }
        }

        Self { resolved }
    }

    pub fn get(&self, field: Field) -> Option<&Resolution> {
        self.resolved.get(&field)
    }

    /// Resolved fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Resolution)> {
        self.resolved.iter()
    }

    /// Trimmed, non-empty value of `field` in `record`
    pub fn value<'r>(&self, record: &'r Record, field: Field) -> Option<&'r str> {
        let key = &self.get(field)?.key;
        record
            .get(key)?
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Label the value is compared against when filtering header rows
    pub fn label(&self, field: Field) -> Option<&str> {
        self.get(field).map(|r| r.key.as_str())
    }

    /// Percentage of fields that resolved
    pub fn coverage(&self) -> u8 {
        ((self.resolved.len() * 100) / Field::ALL.len()) as u8
    }
}

fn match_confidence(label: &str, alias: &str) -> u8 {
    let label_lower = label.to_lowercase();
    let alias_lower = alias.to_lowercase();

    if label == alias {
        100
    } else if label_lower == alias_lower {
        95
    } else if label_lower.contains(&alias_lower) {
        80
    } else if alias_lower.contains(&label_lower) {
        70
    } else {
        0
    }
}

/// Aliases this short only match whole labels; `PO` would otherwise bind
/// to `TOTAL PO`
const SHORT_ALIAS_LEN: usize = 3;

/// Lowest confidence an alias may bind at. The configured key and short
/// aliases must match the whole label, ignoring case.
fn min_confidence_for(alias: &str, configured: &str) -> u8 {
    if alias == configured || alias.chars().count() <= SHORT_ALIAS_LEN {
        95
    } else {
        MIN_CONFIDENCE
    }
}

fn best_alias_match(field: Field, configured: &str, observed: &[&str]) -> Option<Resolution> {
    let mut best: Option<Resolution> = None;

    for label in observed {
        if label.trim().is_empty() {
            continue;
        }
        for alias in std::iter::once(configured).chain(field.aliases().iter().copied()) {
            let confidence = match_confidence(label, alias);
            if confidence >= min_confidence_for(alias, configured)
                && best.as_ref().map_or(true, |b| confidence > b.confidence)
            {
                best = Some(Resolution {
                    key: label.to_string(),
                    confidence,
                });
            }
        }
    }

    best
}
