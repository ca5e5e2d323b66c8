//! Quotation entity - customer price requests (RFQs)

use serde::{Deserialize, Serialize};

/// A price request, created once per request number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub custom_request_number: String,
    /// ISO date; the configured fallback when the sheet's date is unusable
    pub request_date: String,
    pub status: String,
    pub client_name: String,
}

/// One priced line of a quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    /// Position of the parent in `ImportBatch::quotations`
    pub quotation_index: usize,
    /// Position of the item in `ImportBatch::items`
    pub item_index: usize,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}
