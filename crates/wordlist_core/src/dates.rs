use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use engine_logging::engine_info;

use crate::output::AtomicOutput;
use crate::GenerateError;

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

const DATE_FORMAT: &str = "%d%m%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSummary {
    pub days: u64,
    pub output_path: PathBuf,
}

/// Every calendar day from Jan 1 of the start year through Dec 31 of the end year.
#[derive(Debug, Clone)]
pub struct DayRange {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl DayRange {
    pub fn new(start_year: i32, end_year: i32) -> Result<Self, GenerateError> {
        for year in [start_year, end_year] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(GenerateError::YearOutOfRange(year));
            }
        }
        if end_year < start_year {
            return Err(GenerateError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }
        let first = NaiveDate::from_ymd_opt(start_year, 1, 1)
            .ok_or(GenerateError::YearOutOfRange(start_year))?;
        let last = NaiveDate::from_ymd_opt(end_year, 12, 31)
            .ok_or(GenerateError::YearOutOfRange(end_year))?;
        Ok(Self {
            next: Some(first),
            last,
        })
    }
}

impl Iterator for DayRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = current.succ_opt().filter(|next| *next <= self.last);
        Some(current)
    }
}

/// Write each day as `DDMMYYYY`, one per line.
pub fn write_dates<W: Write>(days: DayRange, out: &mut W) -> io::Result<u64> {
    let mut written = 0u64;
    for day in days {
        writeln!(out, "{}", day.format(DATE_FORMAT))?;
        written += 1;
    }
    Ok(written)
}

/// Generate the date list for `[start_year, end_year]` into `output`, replacing it.
pub fn generate_date_file(
    start_year: i32,
    end_year: i32,
    output: &Path,
) -> Result<DateSummary, GenerateError> {
    let days = DayRange::new(start_year, end_year)?;
    let mut sink = AtomicOutput::create(output)?;
    let written = write_dates(days, sink.writer())?;
    let output_path = sink.commit()?;

    engine_info!(
        "Wrote {} dates for {}..={} to {:?}",
        written,
        start_year,
        end_year,
        output_path
    );
    Ok(DateSummary {
        days: written,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stops_at_last_day() {
        let days: Vec<_> = DayRange::new(2023, 2023).unwrap().collect();
        assert_eq!(days.first(), NaiveDate::from_ymd_opt(2023, 1, 1).as_ref());
        assert_eq!(days.last(), NaiveDate::from_ymd_opt(2023, 12, 31).as_ref());
    }

    #[test]
    fn max_year_terminates() {
        assert_eq!(DayRange::new(MAX_YEAR, MAX_YEAR).unwrap().count(), 365);
    }

    #[test]
    fn out_of_range_year_is_rejected() {
        assert!(matches!(
            DayRange::new(0, 2000),
            Err(GenerateError::YearOutOfRange(0))
        ));
        assert!(matches!(
            DayRange::new(2000, 10_000),
            Err(GenerateError::YearOutOfRange(10_000))
        ));
    }
}
