//! Core module - configuration and asset files

pub mod assets;
pub mod config;

pub use assets::{compute_hash, find_latest_spreadsheet, read_json, write_json, AssetError};
pub use config::Config;
