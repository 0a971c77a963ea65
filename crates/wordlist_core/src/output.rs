use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), OutputError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| OutputError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(OutputError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| OutputError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Truncating output that only replaces `target` once everything was written.
///
/// Lines go to a temp file next to the target; [`AtomicOutput::commit`] renames
/// it into place. Dropping without committing leaves the target untouched.
pub struct AtomicOutput {
    target: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl AtomicOutput {
    pub fn create(target: &Path) -> Result<Self, OutputError> {
        let dir = parent_dir(target);
        ensure_output_dir(dir)?;
        let tmp = NamedTempFile::new_in(dir)?;
        Ok(Self {
            target: target.to_path_buf(),
            writer: BufWriter::new(tmp),
        })
    }

    pub fn writer(&mut self) -> &mut impl Write {
        &mut self.writer
    }

    pub fn commit(self) -> Result<PathBuf, OutputError> {
        let mut tmp = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&self.target)
            .map_err(|e| OutputError::Io(e.error))?;
        Ok(self.target)
    }
}

/// Open `target` for appending, creating it when missing.
pub fn open_append(target: &Path) -> Result<BufWriter<File>, OutputError> {
    ensure_output_dir(parent_dir(target))?;
    let file = OpenOptions::new().create(true).append(true).open(target)?;
    Ok(BufWriter::new(file))
}
