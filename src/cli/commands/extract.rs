//! `rfqi extract` command - spreadsheet to JSON records

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::{find_latest_spreadsheet, write_json, Config};
use crate::sheet::{extract_records, Grid, HeaderLocator, Record};

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Spreadsheet to read (default: newest matching file in the assets directory)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Use this row as the header instead of detecting it (0-based)
    #[arg(long)]
    pub header_row: Option<usize>,
}

pub fn run(args: ExtractArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    execute(&args, &config, global).map(|_| ())
}

/// Extract records and write the intermediate file, returning the records
pub(crate) fn execute(args: &ExtractArgs, config: &Config, global: &GlobalOpts) -> Result<Vec<Record>> {
    let input = match &args.input {
        Some(path) => path.clone(),
        None => find_latest_spreadsheet(&config.assets_dir, &config.extension)?,
    };

    if !global.quiet {
        println!(
            "{} Reading {}",
            style("→").blue(),
            style(input.display()).yellow()
        );
    }

    let grid = Grid::load(&input).into_diagnostic()?;

    let mut locator_config = config.locator.clone();
    if args.header_row.is_some() {
        locator_config.header_row = args.header_row;
    }
    let located = HeaderLocator::new(locator_config).locate(&grid)?;
    log::debug!("columns: {}", located.table.labels.join(" | "));

    if !global.quiet {
        println!(
            "{} Header row {} ({}), {} column(s)",
            style("✓").green(),
            style(located.header_row).cyan(),
            located.detection,
            located.table.labels.len()
        );
    }

    let records = extract_records(&located.table);
    let path = config.intermediate_path();
    let digest = write_json(&path, &records)?;

    if !global.quiet {
        println!(
            "{} Extracted {} record(s) to {}",
            style("✓").green(),
            style(records.len()).cyan(),
            style(path.display()).yellow()
        );
        println!("  {}", style(format!("sha256 {}", digest)).dim());
    }

    Ok(records)
}
