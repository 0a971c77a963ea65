//! wordkit: wordlist merging, date lists, username harvesting and password filtering.
mod cli;
mod dispatch;

use anyhow::Result;
use clap::Parser;
use std::time::Instant;

use crate::cli::Cli;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    engine_logging::initialize(cli.log_to.into(), cli.verbose);
    dispatch::handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
