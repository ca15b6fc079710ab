use anyhow::Result;
use clap::Parser;
use log::info;

use palpack::{cli::CLIArguments, pipeline};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CLIArguments::parse();
    let report = pipeline::run(&args.into_config())?;

    info!(
        "compacted {} bitmaps, embedded {} resources into {}",
        report.compactions.len(),
        report.resources.len(),
        report.table.display()
    );
    Ok(())
}
