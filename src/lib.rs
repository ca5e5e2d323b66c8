//! rfqi: RFQ and purchase order spreadsheet importer
//!
//! Two stages, each writing a JSON file:
//!
//! 1. **extract** - find the header row of a loosely formatted spreadsheet
//!    and dump its rows as records
//! 2. **normalize** - clean dates and numbers, deduplicate items, price
//!    requests and purchase orders, and emit index-linked collections

pub mod cli;
pub mod core;
pub mod entities;
pub mod normalize;
pub mod sheet;
