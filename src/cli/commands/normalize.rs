//! `rfqi normalize` command - JSON records to entity collections

use console::style;
use indexmap::IndexMap;
use miette::Result;

use crate::cli::helpers::{count_table, print_columns, print_sample};
use crate::cli::GlobalOpts;
use crate::core::{read_json, write_json, Config};
use crate::normalize::{normalize, Deduplicator};
use crate::sheet::{records_from_json, Record};

#[derive(clap::Args, Debug, Clone, Default)]
pub struct NormalizeArgs {
    /// Process at most this many valid records
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: NormalizeArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let path = config.intermediate_path();
    let rows: Vec<IndexMap<String, serde_json::Value>> = read_json(&path)?;
    let records = records_from_json(rows);

    if !global.quiet {
        println!(
            "{} Loaded {} record(s) from {}",
            style("→").blue(),
            style(records.len()).cyan(),
            style(path.display()).yellow()
        );
    }

    execute(&args, &config, global, &records)
}

/// Normalize `records` and write the output file
pub(crate) fn execute(
    args: &NormalizeArgs,
    config: &Config,
    global: &GlobalOpts,
    records: &[Record],
) -> Result<()> {
    let mut normalize_config = config.normalize_config();
    if args.limit.is_some() {
        normalize_config.record_limit = args.limit;
    }

    let out = normalize(records, &normalize_config);

    if global.verbose {
        let dedup = Deduplicator::new(&normalize_config, out.columns.clone());
        if let Some(sample) = records.iter().find(|r| dedup.is_valid(r)) {
            print_sample(sample);
        }
    }

    let path = config.output_path();
    let digest = write_json(&path, &out.batch)?;

    if global.quiet {
        return Ok(());
    }

    print_columns(&out.columns);

    let stats = &out.stats;
    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Normalize Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Records read:     {}", style(stats.records_read).cyan());
    println!("  Valid records:    {}", style(stats.valid).green());
    if stats.invalid > 0 {
        println!("  Dropped:          {}", style(stats.invalid).dim());
    }
    if stats.truncated > 0 {
        println!("  Over limit:       {}", style(stats.truncated).yellow());
    }
    if stats.failed > 0 {
        println!("  Errors:           {}", style(stats.failed).red());
    }
    println!();
    println!("{}", count_table("Collection", &out.batch.counts()));
    println!();
    println!(
        "{} Wrote {}",
        style("✓").green(),
        style(path.display()).yellow()
    );
    println!("  {}", style(format!("sha256 {}", digest)).dim());

    Ok(())
}
