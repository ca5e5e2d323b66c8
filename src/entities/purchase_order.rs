//! Purchase order entity

use serde::{Deserialize, Serialize};

/// A confirmed order, created once per PO number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub po_number: String,
    pub po_date: String,
    pub status: String,
    pub client_name: String,
}

/// One ordered line; only emitted for strictly positive quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    /// Position of the parent in `ImportBatch::purchase_orders`
    pub po_index: usize,
    /// Position of the item in `ImportBatch::items`
    pub item_index: usize,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}
