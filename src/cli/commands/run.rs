//! `rfqi run` command - extract then normalize

use miette::Result;

use crate::cli::GlobalOpts;

use super::extract::{self, ExtractArgs};
use super::normalize::{self, NormalizeArgs};

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub extract: ExtractArgs,

    #[command(flatten)]
    pub normalize: NormalizeArgs,
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let records = extract::execute(&args.extract, &config, global)?;
    if !global.quiet {
        println!();
    }
    normalize::execute(&args.normalize, &config, global, &records)
}
