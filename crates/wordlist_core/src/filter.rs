use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info, engine_warn};
use fancy_regex::Regex;
use thiserror::Error;

use crate::output::{open_append, OutputError};

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSummary {
    pub lines_read: u64,
    pub lines_matched: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOutcome {
    pub summary: FilterSummary,
    /// First match of each matching line, in corpus order.
    pub matches: Vec<String>,
}

/// Search every line for the first match of `pattern`.
///
/// Lines are independent; a regex runtime failure on one line counts as a miss.
pub fn scan_corpus<R: BufRead>(reader: R, pattern: &Regex) -> io::Result<FilterOutcome> {
    let mut outcome = FilterOutcome::default();
    for line in reader.lines() {
        let line = line?;
        outcome.summary.lines_read += 1;
        match pattern.find(&line) {
            Ok(Some(found)) => {
                engine_debug!("{}", found.as_str());
                outcome.summary.lines_matched += 1;
                outcome.matches.push(found.as_str().to_string());
            }
            Ok(None) => {}
            Err(err) => {
                engine_warn!(
                    "Pattern failed on line {}: {}",
                    outcome.summary.lines_read,
                    err
                );
            }
        }
    }
    Ok(outcome)
}

pub fn append_matches<W: Write>(matches: &[String], out: &mut W) -> io::Result<()> {
    for found in matches {
        writeln!(out, "{found}")?;
    }
    out.flush()
}

/// Filter `input` with `pattern`, appending matches to `output`.
///
/// The corpus is fully scanned before `output` is opened, so a read failure
/// appends nothing.
pub fn filter_file(
    input: &Path,
    output: &Path,
    pattern: &Regex,
) -> Result<FilterSummary, FilterError> {
    let read_err = |source| FilterError::Read {
        path: input.to_path_buf(),
        source,
    };
    let file = File::open(input).map_err(read_err)?;
    let outcome = scan_corpus(BufReader::new(file), pattern).map_err(read_err)?;
    engine_info!("Read {} lines in total", outcome.summary.lines_read);

    let mut sink = open_append(output)?;
    append_matches(&outcome.matches, &mut sink)?;

    engine_info!(
        "Extracted {} matching lines from {} total lines",
        outcome.summary.lines_matched,
        outcome.summary.lines_read
    );
    Ok(outcome.summary)
}
