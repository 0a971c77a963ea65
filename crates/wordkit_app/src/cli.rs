use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use engine_logging::LogDestination;
use harvester_engine::UserId;
use wordlist_core::PatternKind;

struct DefaultArgs;

impl DefaultArgs {
    pub const START_YEAR: &'static str = "1970";
    pub const END_YEAR: &'static str = "2026";
    pub const BASE_URL: &'static str = harvester_engine::DEFAULT_BASE_URL;
    pub const START_ID: &'static str = "1";
    pub const END_ID: &'static str = "1000";
    pub const MAX_WORKERS: &'static str = "20";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Generate every DDMMYYYY date in a year range.
    Date,
    /// Resolve usernames for a range of numeric user IDs.
    Crawl,
    /// Merge two wordlists as a Cartesian product.
    Combine,
    /// Extract pattern matches from a password corpus.
    Filter,
}

impl Mode {
    pub fn default_output(self) -> &'static str {
        match self {
            Mode::Date => "date_times.txt",
            Mode::Crawl => "vozer_crawler.txt",
            Mode::Combine => "combined.txt",
            Mode::Filter => "filtered_passwords.txt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    #[value(name = "all_four")]
    AllFour,
    #[value(name = "three_conditions")]
    ThreeConditions,
    #[value(name = "letter_digit_special")]
    LetterDigitSpecial,
    #[value(name = "upper_lower_digit")]
    UpperLowerDigit,
    #[value(name = "digit_and_letter")]
    DigitAndLetter,
    #[value(name = "voz_username")]
    VozUsername,
    #[value(name = "default")]
    Default,
}

impl From<PatternArg> for PatternKind {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::AllFour => PatternKind::AllFour,
            PatternArg::ThreeConditions => PatternKind::ThreeConditions,
            PatternArg::LetterDigitSpecial => PatternKind::LetterDigitSpecial,
            PatternArg::UpperLowerDigit => PatternKind::UpperLowerDigit,
            PatternArg::DigitAndLetter => PatternKind::DigitAndLetter,
            PatternArg::VozUsername => PatternKind::VozUsername,
            PatternArg::Default => PatternKind::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTo {
    Terminal,
    File,
    Both,
}

impl From<LogTo> for LogDestination {
    fn from(arg: LogTo) -> Self {
        match arg {
            LogTo::Terminal => LogDestination::Terminal,
            LogTo::File => LogDestination::File,
            LogTo::Both => LogDestination::Both,
        }
    }
}

/// Generate date lists, crawl usernames, combine wordlists or filter passwords.
#[derive(Debug, Clone, Parser)]
#[command(name = "wordkit")]
#[command(about = "Generate date list, crawl voz usernames, combine wordlists or filter passwords.")]
pub struct Cli {
    /// Operation to run.
    #[arg(long, value_enum)]
    pub mode: Mode,

    /// Start year for date generation.
    #[arg(long, default_value = DefaultArgs::START_YEAR, allow_negative_numbers = true)]
    pub start_year: i32,

    /// End year for date generation (inclusive).
    #[arg(long, default_value = DefaultArgs::END_YEAR, allow_negative_numbers = true)]
    pub end_year: i32,

    /// Base URL to crawl; each probe requests `{base-url}.{id}/`.
    #[arg(long, default_value = DefaultArgs::BASE_URL)]
    pub base_url: String,

    /// First user ID to crawl.
    #[arg(long, default_value = DefaultArgs::START_ID)]
    pub start_id: UserId,

    /// Last user ID to crawl (inclusive).
    #[arg(long, default_value = DefaultArgs::END_ID)]
    pub end_id: UserId,

    /// Number of concurrent probes. Mind the server's limits.
    #[arg(long, default_value = DefaultArgs::MAX_WORKERS)]
    pub max_workers: usize,

    /// Write crawl results in ascending ID order instead of completion order.
    #[arg(long)]
    pub ordered: bool,

    /// RON file with headers, cookies and timeouts for the crawl session.
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// Extra request header, `Name: value`. Repeatable.
    #[arg(long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request cookie, `name=value`. Repeatable.
    #[arg(long = "cookie", value_name = "COOKIE")]
    pub cookies: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// First wordlist to combine.
    #[arg(long)]
    pub file1: Option<PathBuf>,

    /// Second wordlist to combine.
    #[arg(long)]
    pub file2: Option<PathBuf>,

    /// Password corpus to filter.
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Named pattern for password filtering.
    #[arg(long, value_enum, default_value_t = PatternArg::Default)]
    pub pattern_type: PatternArg,

    /// Custom regex for password filtering. Overrides --pattern-type.
    #[arg(long)]
    pub custom_pattern: Option<String>,

    /// Output file. Defaults depend on the mode.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogTo::Terminal)]
    pub log_to: LogTo,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.mode.default_output()))
    }
}
