//! Wordlist core: synchronous generators, the pattern registry and the line filter.
mod combine;
mod dates;
mod error;
mod filter;
mod output;
mod patterns;

pub use combine::{combine_files, read_words, write_product, CombineSummary};
pub use dates::{generate_date_file, write_dates, DateSummary, DayRange, MAX_YEAR, MIN_YEAR};
pub use error::GenerateError;
pub use filter::{
    append_matches, filter_file, scan_corpus, FilterError, FilterOutcome, FilterSummary,
};
pub use output::{ensure_output_dir, open_append, AtomicOutput, OutputError};
pub use patterns::{compile_pattern, select_pattern, PatternKind};
