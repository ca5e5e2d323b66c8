//! Entity types emitted by the normalizer
//!
//! **Catalogue:**
//! - [`Item`] - A part/line-item pair, keyed by `part_number` + `line_item`
//!
//! **Price requests:**
//! - [`Quotation`] - A request for pricing, keyed by request number
//! - [`QuotationItem`] - A priced line on a quotation
//!
//! **Orders:**
//! - [`PurchaseOrder`] - A confirmed order, keyed by PO number
//! - [`PurchaseOrderItem`] - An ordered line with quantity and price
//!
//! Association records refer to their parents by position in the
//! [`ImportBatch`] collections rather than by database ID, so the batch can
//! be inserted in one transaction later.

pub mod item;
pub mod purchase_order;
pub mod quotation;

pub use item::Item;
pub use purchase_order::{PurchaseOrder, PurchaseOrderItem};
pub use quotation::{Quotation, QuotationItem};

use serde::{Deserialize, Serialize};

/// The five normalized collections written to the output file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub items: Vec<Item>,
    pub quotations: Vec<Quotation>,
    pub quotation_items: Vec<QuotationItem>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub purchase_order_items: Vec<PurchaseOrderItem>,
}

impl ImportBatch {
    /// Collection names paired with their lengths, in output order
    pub fn counts(&self) -> [(&'static str, usize); 5] {
        [
            ("items", self.items.len()),
            ("quotations", self.quotations.len()),
            ("quotation_items", self.quotation_items.len()),
            ("purchase_orders", self.purchase_orders.len()),
            ("purchase_order_items", self.purchase_order_items.len()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.counts().iter().all(|(_, n)| *n == 0)
    }
}
