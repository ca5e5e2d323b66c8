//! Configuration management with layered hierarchy
//!
//! Layers, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Global user config (`~/.config/rfqi/config.yaml`)
//! 3. Working directory config (`rfqi.yaml`)
//! 4. Environment variables (`RFQI_ASSETS_DIR`, `RFQI_RECORD_LIMIT`)
//!
//! Command-line flags are applied on top by the commands themselves.
//! Files are merged key by key, so a layer only needs the keys it changes.

use serde::{Deserialize, Serialize};
use serde_yml::Value;
use std::path::{Path, PathBuf};

use crate::normalize::{ColumnMap, Defaults, NormalizeConfig};
use crate::sheet::LocatorConfig;

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "rfqi.yaml";

/// rfqi configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the spreadsheet and the JSON files
    pub assets_dir: PathBuf,

    /// Spreadsheet extension picked up by discovery
    pub extension: String,

    /// Intermediate records file, relative to `assets_dir`
    pub intermediate_file: String,

    /// Normalized output file, relative to `assets_dir`
    pub output_file: String,

    pub locator: LocatorConfig,

    pub columns: ColumnMap,

    pub defaults: Defaults,

    /// Cap on valid records processed by `normalize`
    pub record_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("attached_assets"),
            extension: "xlsx".to_string(),
            intermediate_file: "excel_import_data.json".to_string(),
            output_file: "processed_import_data.json".to_string(),
            locator: LocatorConfig::default(),
            columns: ColumnMap::default(),
            defaults: Defaults::default(),
            record_limit: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(&cwd)
    }

    /// Load configuration using `dir` as the working directory
    pub fn load_from(dir: &Path) -> Self {
        let layers = Self::global_config_path()
            .into_iter()
            .chain(std::iter::once(dir.join(LOCAL_CONFIG_FILE)));
        let mut config = Self::load_layers(layers);
        config.apply_env();
        config
    }

    /// Merge YAML files over the defaults, later paths winning.
    /// Environment variables are not consulted.
    pub fn load_layers<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut merged = match serde_yml::to_value(Config::default()) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("failed to serialize default config: {}", e);
                return Config::default();
            }
        };

        for path in paths {
            if let Some(layer) = read_layer(&path) {
                log::debug!("merging config from {}", path.display());
                merge_values(&mut merged, layer);
            }
        }

        match serde_yml::from_value::<Config>(merged) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring invalid configuration: {}", e);
                Config::default()
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("RFQI_ASSETS_DIR") {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Ok(limit) = std::env::var("RFQI_RECORD_LIMIT") {
            match limit.trim().parse::<usize>() {
                Ok(n) => self.record_limit = Some(n),
                Err(_) => log::warn!("ignoring RFQI_RECORD_LIMIT={:?}: not a number", limit),
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rfqi")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn intermediate_path(&self) -> PathBuf {
        self.assets_dir.join(&self.intermediate_file)
    }

    pub fn output_path(&self) -> PathBuf {
        self.assets_dir.join(&self.output_file)
    }

    /// Settings for the normalize stage
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            columns: self.columns.clone(),
            defaults: self.defaults.clone(),
            record_limit: self.record_limit,
        }
    }
}

/// Read one YAML layer; missing files are skipped silently, broken ones
/// with a warning
fn read_layer(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_yml::from_str::<Value>(&contents) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring {}: {}", path.display(), e);
            None
        }
    }
}

/// Merge `overlay` into `base`; mappings merge per key, anything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
