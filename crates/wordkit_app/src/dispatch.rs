//! Routes a parsed command line to the matching operation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use engine_logging::engine_info;
use harvester_engine::{
    HarvestConfig, HarvestSummary, Harvester, LedgerOrder, LogProgressSink, ReqwestProber,
    SessionConfig,
};
use wordlist_core::{
    combine_files, filter_file, generate_date_file, select_pattern, CombineSummary, DateSummary,
    FilterSummary,
};

use crate::cli::{Cli, Mode};

pub fn handle_run(cli: &Cli) -> Result<()> {
    let output = cli.output_path();
    match cli.mode {
        Mode::Date => {
            run_date(cli, &output)?;
            println!("Date list has been written to {}", output.display());
        }
        Mode::Crawl => {
            run_crawl(cli, &output)?;
            println!("Crawling finished. Data saved to {}", output.display());
        }
        Mode::Combine => {
            run_combine(cli, &output)?;
            println!("Combined wordlist has been written to {}", output.display());
        }
        Mode::Filter => {
            let summary = run_filter(cli, &output)?;
            println!(
                "Extracted {} matching passwords from {} total passwords",
                summary.lines_matched, summary.lines_read
            );
            println!("Filtered passwords have been written to {}", output.display());
        }
    }
    Ok(())
}

fn run_date(cli: &Cli, output: &Path) -> Result<DateSummary> {
    generate_date_file(cli.start_year, cli.end_year, output)
        .with_context(|| format!("date generation into {}", output.display()))
}

fn run_combine(cli: &Cli, output: &Path) -> Result<CombineSummary> {
    let (file1, file2) = match (&cli.file1, &cli.file2) {
        (Some(file1), Some(file2)) => (file1, file2),
        _ => bail!("When mode='combine', you must provide both --file1 and --file2"),
    };
    combine_files(file1, file2, output)
        .with_context(|| format!("combining into {}", output.display()))
}

fn run_filter(cli: &Cli, output: &Path) -> Result<FilterSummary> {
    let Some(input) = cli.input_file.as_deref() else {
        bail!("When mode='filter', you must provide --input-file");
    };
    let pattern = select_pattern(cli.pattern_type.into(), cli.custom_pattern.as_deref())?;
    filter_file(input, output, &pattern)
        .with_context(|| format!("filtering {} into {}", input.display(), output.display()))
}

fn session_from_cli(cli: &Cli) -> Result<SessionConfig> {
    let mut session = match &cli.session_file {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    for header in &cli.headers {
        session.set_header_arg(header)?;
    }
    for cookie in &cli.cookies {
        session.set_cookie_arg(cookie)?;
    }
    if let Some(timeout) = cli.timeout_secs {
        session.timeout_secs = timeout;
    }
    Ok(session)
}

fn harvest_config_from_cli(cli: &Cli) -> HarvestConfig {
    HarvestConfig {
        base_url: cli.base_url.clone(),
        start_id: cli.start_id,
        end_id: cli.end_id,
        max_workers: cli.max_workers,
        order: if cli.ordered {
            LedgerOrder::Ascending
        } else {
            LedgerOrder::Completion
        },
    }
}

fn run_crawl(cli: &Cli, output: &Path) -> Result<HarvestSummary> {
    let config = harvest_config_from_cli(cli);
    config.validate()?;
    let session = session_from_cli(cli)?;
    engine_info!(
        "Crawl session: {} headers, {} cookies, {}s timeout",
        session.headers.len(),
        session.cookies.len(),
        session.timeout_secs
    );

    let prober = ReqwestProber::new(&session)?;
    let harvester =
        Harvester::new(config, Arc::new(prober))?.with_progress_sink(Arc::new(LogProgressSink));
    let summary = harvester
        .run_blocking(output)
        .with_context(|| format!("crawling into {}", output.display()))?;
    Ok(summary)
}
