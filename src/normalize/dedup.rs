//! Entity deduplication
//!
//! A single pass over the extracted records, in file order, builds the five
//! output collections. Items, quotations and purchase orders are created the
//! first time their key is seen; association lines are appended for every
//! record and point back at their parents by index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::entities::{
    ImportBatch, Item, PurchaseOrder, PurchaseOrderItem, Quotation, QuotationItem,
};
use crate::sheet::Record;

use super::columns::{ColumnMap, Field, ResolvedColumns};
use super::values::{clean_date, clean_number};

/// Values used when a record leaves a field blank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub unit_of_measure: String,
    pub category: String,
    pub quotation_status: String,
    pub purchase_order_status: String,
    pub client_name: String,
    /// ISO date used when a request or order date cannot be parsed
    pub date: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            unit_of_measure: "EACH".to_string(),
            category: "GENERAL".to_string(),
            quotation_status: "completed".to_string(),
            purchase_order_status: "delivered".to_string(),
            client_name: "EDC".to_string(),
            date: "2025-01-01".to_string(),
        }
    }
}

/// Normalizer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub columns: ColumnMap,
    pub defaults: Defaults,
    /// Process at most this many valid records (unlimited when unset)
    pub record_limit: Option<usize>,
}

/// Counters reported after a normalization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub records_read: usize,
    pub valid: usize,
    /// Dropped by the validity filter
    pub invalid: usize,
    /// Valid but beyond the record limit
    pub truncated: usize,
    /// Skipped after a processing error
    pub failed: usize,
}

/// Result of [`normalize`]
#[derive(Debug, Clone)]
pub struct Normalized {
    pub batch: ImportBatch,
    pub stats: NormalizeStats,
    pub columns: ResolvedColumns,
}

/// Per-record processing failure. The record is skipped, the run continues.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("{field} total {quantity} x {price} is not a finite number")]
    NonFiniteTotal {
        field: &'static str,
        quantity: f64,
        price: f64,
    },

    #[error("missing required field '{0}'")]
    MissingField(Field),
}

/// Required identity of a valid record
struct ItemFields<'r> {
    part_number: &'r str,
    line_item: &'r str,
    description: &'r str,
}

/// A priced line computed before anything is committed
struct Line {
    quantity: f64,
    unit_price: f64,
    total_price: f64,
}

impl Line {
    fn priced(field: &'static str, quantity: f64, unit_price: f64) -> Result<Self, RecordError> {
        let total_price = quantity * unit_price;
        if !total_price.is_finite() {
            return Err(RecordError::NonFiniteTotal {
                field,
                quantity,
                price: unit_price,
            });
        }
        Ok(Self {
            quantity,
            unit_price,
            total_price,
        })
    }
}

/// Builds an [`ImportBatch`] from records, deduplicating by key
pub struct Deduplicator<'c> {
    config: &'c NormalizeConfig,
    columns: ResolvedColumns,
    batch: ImportBatch,
    items: HashMap<String, usize>,
    quotations: HashMap<String, usize>,
    purchase_orders: HashMap<String, usize>,
}

impl<'c> Deduplicator<'c> {
    pub fn new(config: &'c NormalizeConfig, columns: ResolvedColumns) -> Self {
        Self {
            config,
            columns,
            batch: ImportBatch::default(),
            items: HashMap::new(),
            quotations: HashMap::new(),
            purchase_orders: HashMap::new(),
        }
    }

    /// Whether the record names an item: part number, line item and
    /// description present, not `nan`, and not a repeated header row
    pub fn is_valid(&self, record: &Record) -> bool {
        self.item_fields(record).is_ok()
    }

    fn item_fields<'r>(&self, record: &'r Record) -> Result<ItemFields<'r>, RecordError> {
        let field = |f: Field| {
            let value = self.columns.value(record, f);
            let is_label = |v: &str| self.columns.label(f).map_or(false, |label| label == v);
            value
                .filter(|v| !is_label(*v) && !v.eq_ignore_ascii_case("nan"))
                .ok_or(RecordError::MissingField(f))
        };

        Ok(ItemFields {
            part_number: field(Field::PartNumber)?,
            line_item: field(Field::LineItem)?,
            description: field(Field::Description)?,
        })
    }

    /// Process one record. Nothing is added to the batch unless every step
    /// succeeds.
    pub fn process(&mut self, record: &Record) -> Result<(), RecordError> {
        let fields = self.item_fields(record)?;
        let cols = &self.columns;
        let defaults = &self.config.defaults;

        let rfq_number = cols.value(record, Field::RfqNumber);
        let rfq_line = match rfq_number {
            Some(_) => Some(Line::priced(
                "quotation",
                clean_number(cols.value(record, Field::RfqQuantity).unwrap_or("")),
                clean_number(cols.value(record, Field::RfqPrice).unwrap_or("")),
            )?),
            None => None,
        };

        let po_number = cols
            .value(record, Field::PoNumber)
            .filter(|po| !po.eq_ignore_ascii_case("nan"));
        let po_line = match po_number {
            Some(_) => {
                let quantity = clean_number(cols.value(record, Field::PoQuantity).unwrap_or(""));
                if quantity > 0.0 {
                    Some(Line::priced(
                        "purchase order",
                        quantity,
                        clean_number(cols.value(record, Field::PoPrice).unwrap_or("")),
                    )?)
                } else {
                    None
                }
            }
            None => None,
        };

        let rfq_date = cols.value(record, Field::RfqDate).and_then(clean_date);
        let po_date = cols.value(record, Field::PoDate).and_then(clean_date);
        let unit_of_measure = cols
            .value(record, Field::UnitOfMeasure)
            .unwrap_or(&defaults.unit_of_measure)
            .to_string();
        let category = cols
            .value(record, Field::Category)
            .unwrap_or(&defaults.category)
            .to_string();

        // Commit
        let item_key = Item::key(fields.part_number, fields.line_item);
        let item_index = match self.items.get(&item_key) {
            Some(&index) => index,
            None => {
                self.batch.items.push(Item {
                    item_number: Item::imported_number(self.batch.items.len() + 1),
                    part_number: fields.part_number.to_string(),
                    line_item: fields.line_item.to_string(),
                    description: fields.description.to_string(),
                    unit_of_measure,
                    category,
                });
                let index = self.batch.items.len() - 1;
                self.items.insert(item_key, index);
                index
            }
        };

        if let (Some(number), Some(line)) = (rfq_number, rfq_line) {
            let quotation_index = match self.quotations.get(number) {
                Some(&index) => index,
                None => {
                    self.batch.quotations.push(Quotation {
                        custom_request_number: number.to_string(),
                        request_date: rfq_date.unwrap_or_else(|| defaults.date.clone()),
                        status: defaults.quotation_status.clone(),
                        client_name: defaults.client_name.clone(),
                    });
                    let index = self.batch.quotations.len() - 1;
                    self.quotations.insert(number.to_string(), index);
                    index
                }
            };
            self.batch.quotation_items.push(QuotationItem {
                quotation_index,
                item_index,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: line.total_price,
            });
        }

        if let Some(number) = po_number {
            let po_index = match self.purchase_orders.get(number) {
                Some(&index) => index,
                None => {
                    self.batch.purchase_orders.push(PurchaseOrder {
                        po_number: number.to_string(),
                        po_date: po_date.unwrap_or_else(|| defaults.date.clone()),
                        status: defaults.purchase_order_status.clone(),
                        client_name: defaults.client_name.clone(),
                    });
                    let index = self.batch.purchase_orders.len() - 1;
                    self.purchase_orders.insert(number.to_string(), index);
                    index
                }
            };
            if let Some(line) = po_line {
                self.batch.purchase_order_items.push(PurchaseOrderItem {
                    po_index,
                    item_index,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    total_price: line.total_price,
                });
            }
        }

        Ok(())
    }

    pub fn finish(self) -> (ImportBatch, ResolvedColumns) {
        (self.batch, self.columns)
    }
}

/// Filter, deduplicate and index `records` in one pass
pub fn normalize(records: &[Record], config: &NormalizeConfig) -> Normalized {
    let columns = ResolvedColumns::resolve(&config.columns, records);
    let mut dedup = Deduplicator::new(config, columns);
    let mut stats = NormalizeStats {
        records_read: records.len(),
        ..NormalizeStats::default()
    };

    let valid: Vec<(usize, &Record)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| dedup.is_valid(record))
        .collect();
    stats.valid = valid.len();
    stats.invalid = records.len() - valid.len();
    log::info!("{} of {} record(s) are valid", stats.valid, stats.records_read);

    let limit = config.record_limit.unwrap_or(usize::MAX);
    if valid.len() > limit {
        stats.truncated = valid.len() - limit;
        log::warn!(
            "record limit {} reached, skipping {} valid record(s)",
            limit,
            stats.truncated
        );
    }

    for (position, record) in valid.into_iter().take(limit) {
        if let Err(e) = dedup.process(record) {
            log::warn!("skipping record {}: {}", position, e);
            stats.failed += 1;
        }
    }

    let (batch, columns) = dedup.finish();
    Normalized {
        batch,
        stats,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), (!v.is_empty()).then(|| v.to_string())))
            .collect()
    }

    fn line(part: &str, line_item: &str, rfq: &str, qty: &str, price: &str) -> Record {
        record(&[
            ("LINE ITEM", line_item),
            ("PART NO", part),
            ("DESCREPTION", "Contactor 32A"),
            ("UOM", ""),
            ("Catogry", ""),
            ("RFQ", rfq),
            ("DATE/RFQ", "15/03/2024"),
            ("QTY", qty),
            ("PRICE/RFQ", price),
            ("PO", ""),
            ("DATE /PO", ""),
            ("Quantity/PO", ""),
            ("PRICE/PO", ""),
        ])
    }

    fn with(mut record: Record, key: &str, value: &str) -> Record {
        record.insert(key.to_string(), Some(value.to_string()));
        record
    }

    #[test]
    fn test_shared_item_key_creates_one_item() {
        let records = vec![
            line("A1", "L1", "R-1", "2", "10"),
            line("A1", "L1", "R-2", "3", "12"),
        ];

        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.batch.items.len(), 1);
        assert_eq!(out.batch.quotation_items.len(), 2);
        assert!(out.batch.quotation_items.iter().all(|qi| qi.item_index == 0));
        assert_eq!(out.batch.quotation_items[1].quotation_index, 1);
    }

    #[test]
    fn test_item_defaults_and_numbering() {
        let records = vec![
            line("A1", "L1", "", "", ""),
            line("B2", "L1", "", "", ""),
            line("A1", "L1", "", "", ""),
            line("C3", "L2", "", "", ""),
        ];

        let out = normalize(&records, &NormalizeConfig::default());
        let numbers: Vec<&str> = out.batch.items.iter().map(|i| i.item_number.as_str()).collect();
        assert_eq!(numbers, vec!["IMPORTED_000001", "IMPORTED_000002", "IMPORTED_000003"]);
        assert_eq!(out.batch.items[0].unit_of_measure, "EACH");
        assert_eq!(out.batch.items[0].category, "GENERAL");
        assert!(out.batch.quotations.is_empty());
    }

    #[test]
    fn test_missing_description_is_dropped_everywhere() {
        let mut bad = line("Z9", "L9", "R-9", "1", "1");
        bad.insert("DESCREPTION".to_string(), None);
        let bad = with(bad, "PO", "P-9");
        let records = vec![bad, line("A1", "L1", "R-1", "1", "5")];

        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.stats.invalid, 1);
        assert_eq!(out.batch.items.len(), 1);
        assert_eq!(out.batch.items[0].part_number, "A1");
        assert_eq!(out.batch.quotations.len(), 1);
        assert_eq!(out.batch.quotations[0].custom_request_number, "R-1");
        assert!(out.batch.purchase_orders.is_empty());
    }

    #[test]
    fn test_header_and_nan_rows_are_invalid() {
        let records = vec![
            line("PART NO", "LINE ITEM", "RFQ", "QTY", "PRICE/RFQ"),
            line("nan", "L1", "R-1", "1", "1"),
            line("A1", "NaN", "R-1", "1", "1"),
        ];

        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.stats.valid, 0);
        assert!(out.batch.is_empty());
    }

    #[test]
    fn test_quotation_fields_and_totals() {
        let records = vec![
            line("A1", "L1", "R-1", "1,000", "$2.50"),
            with(line("B2", "L1", "R-1", "", "4"), "DATE/RFQ", "garbage"),
        ];

        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.batch.quotations.len(), 1);
        let quotation = &out.batch.quotations[0];
        assert_eq!(quotation.request_date, "2024-03-15");
        assert_eq!(quotation.status, "completed");
        assert_eq!(quotation.client_name, "EDC");

        let first = &out.batch.quotation_items[0];
        assert_eq!(first.quantity, 1000.0);
        assert_eq!(first.unit_price, 2.5);
        assert_eq!(first.total_price, 2500.0);

        // Zero quantity still yields a quotation line
        let second = &out.batch.quotation_items[1];
        assert_eq!(second.quantity, 0.0);
        assert_eq!(second.total_price, 0.0);
        assert_eq!(second.item_index, 1);
    }

    #[test]
    fn test_unparseable_request_date_uses_default() {
        let records = vec![with(line("A1", "L1", "R-1", "1", "1"), "DATE/RFQ", "someday")];
        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.batch.quotations[0].request_date, "2025-01-01");
    }

    #[test]
    fn test_zero_po_quantity_keeps_order_but_drops_line() {
        let first = with(line("A1", "L1", "", "", ""), "PO", "P-1");
        let first = with(first, "Quantity/PO", "0");
        let first = with(first, "DATE /PO", "2024-02-01 00:00:00");
        let second = with(line("B2", "L1", "", "", ""), "PO", "P-1");
        let second = with(second, "Quantity/PO", "4");
        let second = with(second, "PRICE/PO", "2.5");

        let out = normalize(&[first, second], &NormalizeConfig::default());
        assert_eq!(out.batch.purchase_orders.len(), 1);
        let order = &out.batch.purchase_orders[0];
        assert_eq!(order.po_number, "P-1");
        assert_eq!(order.po_date, "2024-02-01");
        assert_eq!(order.status, "delivered");

        assert_eq!(out.batch.purchase_order_items.len(), 1);
        let poi = &out.batch.purchase_order_items[0];
        assert_eq!(poi.po_index, 0);
        assert_eq!(poi.item_index, 1);
        assert_eq!(poi.total_price, 10.0);
    }

    #[test]
    fn test_nan_po_number_is_ignored() {
        let records = vec![with(line("A1", "L1", "", "", ""), "PO", "nan")];
        let out = normalize(&records, &NormalizeConfig::default());
        assert!(out.batch.purchase_orders.is_empty());
        assert_eq!(out.batch.items.len(), 1);
    }

    #[test]
    fn test_record_limit_counts_valid_records() {
        let mut bad = line("Z9", "L9", "", "", "");
        bad.insert("PART NO".to_string(), None);
        let records = vec![
            bad,
            line("A1", "L1", "", "", ""),
            line("B2", "L1", "", "", ""),
            line("C3", "L1", "", "", ""),
        ];
        let config = NormalizeConfig {
            record_limit: Some(2),
            ..NormalizeConfig::default()
        };

        let out = normalize(&records, &config);
        assert_eq!(out.stats.valid, 3);
        assert_eq!(out.stats.truncated, 1);
        assert_eq!(out.batch.items.len(), 2);
        assert_eq!(out.batch.items[1].part_number, "B2");
    }

    #[test]
    fn test_failed_record_leaves_no_partial_entities() {
        let overflow = line("A1", "L1", "R-1", "1e200", "1e200");
        let records = vec![overflow, line("B2", "L1", "R-2", "1", "1")];

        let out = normalize(&records, &NormalizeConfig::default());
        assert_eq!(out.stats.failed, 1);
        assert_eq!(out.batch.items.len(), 1);
        assert_eq!(out.batch.items[0].part_number, "B2");
        assert_eq!(out.batch.items[0].item_number, "IMPORTED_000001");
        assert_eq!(out.batch.quotations.len(), 1);
        assert_eq!(out.batch.quotation_items[0].quotation_index, 0);
    }

    #[test]
    fn test_process_rejects_invalid_record() {
        let config = NormalizeConfig::default();
        let records = vec![line("", "L1", "", "", "")];
        let columns = ResolvedColumns::resolve(&config.columns, &records);
        let mut dedup = Deduplicator::new(&config, columns);

        assert_eq!(
            dedup.process(&records[0]),
            Err(RecordError::MissingField(Field::PartNumber))
        );
    }

    #[test]
    fn test_process_names_the_missing_field() {
        let config = NormalizeConfig::default();
        let records = vec![
            line("A1", "", "", "", ""),
            with(line("A1", "L1", "", "", ""), "DESCREPTION", "nan"),
            line("A1", "L1", "", "", ""),
        ];
        let columns = ResolvedColumns::resolve(&config.columns, &records);
        let mut dedup = Deduplicator::new(&config, columns);

        assert_eq!(
            dedup.process(&records[0]),
            Err(RecordError::MissingField(Field::LineItem))
        );
        assert_eq!(
            dedup.process(&records[1]),
            Err(RecordError::MissingField(Field::Description))
        );
        assert!(!dedup.is_valid(&records[1]));
        assert_eq!(dedup.process(&records[2]), Ok(()));
    }
}
