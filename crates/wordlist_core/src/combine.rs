use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};

use crate::output::AtomicOutput;
use crate::GenerateError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    pub left_words: usize,
    pub right_words: usize,
    pub lines_written: u64,
    pub output_path: PathBuf,
}

/// Read one word per line, trimming surrounding whitespace. Blank lines stay as empty words.
pub fn read_words(path: &Path) -> Result<Vec<String>, GenerateError> {
    let read_err = |source| GenerateError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    BufReader::new(file)
        .lines()
        .map(|line| line.map(|word| word.trim().to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)
}

/// Write every `left[i] + right[j]` pair, outer loop over `left`, one per line.
pub fn write_product<W: Write>(left: &[String], right: &[String], out: &mut W) -> io::Result<u64> {
    let mut written = 0u64;
    let mut line = String::new();
    for head in left {
        for tail in right {
            line.clear();
            line.push_str(head);
            line.push_str(tail);
            line.push('\n');
            out.write_all(line.as_bytes())?;
            written += 1;
        }
    }
    Ok(written)
}

/// Cartesian merge of two wordlist files into `output`, replacing it.
pub fn combine_files(
    file1: &Path,
    file2: &Path,
    output: &Path,
) -> Result<CombineSummary, GenerateError> {
    let left = read_words(file1)?;
    let right = read_words(file2)?;
    engine_debug!(
        "Combining {} x {} words from {:?} and {:?}",
        left.len(),
        right.len(),
        file1,
        file2
    );

    let mut sink = AtomicOutput::create(output)?;
    let lines_written = write_product(&left, &right, sink.writer())?;
    let output_path = sink.commit()?;

    engine_info!("Wrote {} combined words to {:?}", lines_written, output_path);
    Ok(CombineSummary {
        left_words: left.len(),
        right_words: right.len(),
        lines_written,
        output_path,
    })
}
