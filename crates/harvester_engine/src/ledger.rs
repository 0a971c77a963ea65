//! Output ledger: one line per probed ID.
//!
//! The ledger is owned by a single writer; workers never touch it. In
//! [`LedgerOrder::Completion`] lines appear as results arrive. In
//! [`LedgerOrder::Ascending`] results are held back until every lower ID has
//! been written, so line `k` belongs to ID `first_id + k`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use engine_logging::engine_warn;

use crate::{ProbeResult, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedgerOrder {
    #[default]
    Completion,
    Ascending,
}

/// Create or truncate the ledger file.
pub fn open_ledger(path: &Path) -> io::Result<File> {
    File::create(path)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    pub written: u64,
    pub resolved: u64,
}

pub struct Ledger<W: Write> {
    out: W,
    order: LedgerOrder,
    next_id: UserId,
    pending: BTreeMap<UserId, Option<String>>,
    stats: LedgerStats,
}

impl<W: Write> Ledger<W> {
    pub fn new(out: W, order: LedgerOrder, first_id: UserId) -> Self {
        Self {
            out,
            order,
            next_id: first_id,
            pending: BTreeMap::new(),
            stats: LedgerStats::default(),
        }
    }

    pub fn record(&mut self, result: ProbeResult) -> io::Result<()> {
        match self.order {
            LedgerOrder::Completion => self.write_line(result.username.as_deref()),
            LedgerOrder::Ascending => {
                self.pending.insert(result.id, result.username);
                while let Some(username) = self.pending.remove(&self.next_id) {
                    self.write_line(username.as_deref())?;
                    match self.next_id.checked_add(1) {
                        Some(next) => self.next_id = next,
                        None => break,
                    }
                }
                Ok(())
            }
        }
    }

    fn write_line(&mut self, username: Option<&str>) -> io::Result<()> {
        let mut line = String::with_capacity(username.map_or(0, str::len) + 1);
        line.push_str(username.unwrap_or(""));
        line.push('\n');
        // One write per line keeps lines whole.
        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        self.stats.written += 1;
        if username.is_some() {
            self.stats.resolved += 1;
        }
        Ok(())
    }

    pub fn stats(&self) -> LedgerStats {
        self.stats
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Flush anything still held back (only possible when an ID never arrived)
    /// and hand back the writer with the final counts.
    pub fn finish(mut self) -> io::Result<(W, LedgerStats)> {
        if !self.pending.is_empty() {
            engine_warn!(
                "Ledger gap at id {}; flushing {} buffered results out of position",
                self.next_id,
                self.pending.len()
            );
            let rest = std::mem::take(&mut self.pending);
            for username in rest.into_values() {
                self.write_line(username.as_deref())?;
            }
        }
        self.out.flush()?;
        Ok((self.out, self.stats))
    }
}
