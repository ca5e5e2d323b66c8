//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, extract::ExtractArgs, normalize::NormalizeArgs, run::RunArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "rfqi")]
#[command(author, version, about = "RFQ and purchase order spreadsheet importer")]
#[command(
    long_about = "Extracts records from a loosely formatted RFQ/PO spreadsheet and normalizes them into items, quotations and purchase orders ready for database insertion.\n\nWith no subcommand, runs both stages against the newest spreadsheet in the assets directory."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct GlobalOpts {
    /// Directory holding the spreadsheet and JSON files (default: attached_assets)
    #[arg(long, global = true)]
    pub assets_dir: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Load configuration and apply global flags on top
    pub fn config(&self) -> Config {
        let mut config = Config::load();
        if let Some(dir) = &self.assets_dir {
            config.assets_dir = dir.clone();
        }
        config
    }

    /// Default log filter implied by -v / -q
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate the header row and write the rows as JSON records
    Extract(ExtractArgs),

    /// Clean and deduplicate extracted records into entity collections
    Normalize(NormalizeArgs),

    /// Run extract then normalize (the default)
    Run(RunArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
