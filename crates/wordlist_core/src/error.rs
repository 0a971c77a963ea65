use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::OutputError;

/// Failures of the truncating generators (wordlist merge, date list).
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("end year {end} is before start year {start}")]
    InvalidYearRange { start: i32, end: i32 },
    #[error("year {0} is outside the supported range 1..=9999")]
    YearOutOfRange(i32),
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    #[error(transparent)]
    Output(#[from] OutputError),
}
