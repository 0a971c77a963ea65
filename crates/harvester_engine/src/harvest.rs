use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::{Arc, Mutex};

use engine_logging::{engine_debug, engine_error, engine_info};
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use crate::ledger::{open_ledger, Ledger, LedgerOrder, LedgerStats};
use crate::probe::{NullProgressSink, Prober, ProgressSink};
use crate::session::SessionError;
use crate::username::username_from_location;
use crate::{HarvestEvent, HarvestSummary, ProbeResult, ProbeTarget, UserId};

pub const DEFAULT_BASE_URL: &str = "https://voz.vn/u/dummy";
pub const DEFAULT_MAX_WORKERS: usize = 20;

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("start id {start} is greater than end id {end}")]
    InvalidRange { start: UserId, end: UserId },
    #[error("invalid base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("ledger io error: {0}")]
    Ledger(#[source] io::Error),
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("ledger writer stopped unexpectedly: {0}")]
    Writer(String),
    #[error("ledger has {written} lines for {expected} ids")]
    Incomplete { expected: u64, written: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    pub base_url: String,
    pub start_id: UserId,
    pub end_id: UserId,
    pub max_workers: usize,
    pub order: LedgerOrder,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_id: 1,
            end_id: 1000,
            max_workers: DEFAULT_MAX_WORKERS,
            order: LedgerOrder::Completion,
        }
    }
}

impl HarvestConfig {
    /// Reject anything that would make the run meaningless before work starts.
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.start_id > self.end_id {
            return Err(HarvestError::InvalidRange {
                start: self.start_id,
                end: self.end_id,
            });
        }
        if self.max_workers == 0 {
            return Err(HarvestError::ZeroWorkers);
        }
        let sample = ProbeTarget::new(&self.base_url, self.start_id);
        Url::parse(&sample.url).map_err(|err| HarvestError::InvalidBaseUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;
        Ok(())
    }

    pub fn id_count(&self) -> u64 {
        self.end_id.saturating_sub(self.start_id).saturating_add(1)
    }
}

/// Shared backlog the workers pull IDs from.
struct Backlog {
    ids: Mutex<RangeInclusive<UserId>>,
}

impl Backlog {
    fn new(start: UserId, end: UserId) -> Self {
        Self {
            ids: Mutex::new(start..=end),
        }
    }

    fn next_id(&self) -> Option<UserId> {
        match self.ids.lock() {
            Ok(mut ids) => ids.next(),
            Err(poisoned) => poisoned.into_inner().next(),
        }
    }
}

pub struct Harvester {
    config: HarvestConfig,
    prober: Arc<dyn Prober>,
    sink: Arc<dyn ProgressSink>,
}

impl Harvester {
    pub fn new(config: HarvestConfig, prober: Arc<dyn Prober>) -> Result<Self, HarvestError> {
        config.validate()?;
        Ok(Self {
            config,
            prober,
            sink: Arc::new(NullProgressSink),
        })
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Truncate `path` and harvest into it on a fresh multi-threaded runtime.
    pub fn run_blocking(&self, path: &Path) -> Result<HarvestSummary, HarvestError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(HarvestError::Runtime)?;
        runtime.block_on(self.run_to_file(path))
    }

    pub async fn run_to_file(&self, path: &Path) -> Result<HarvestSummary, HarvestError> {
        let file = open_ledger(path).map_err(HarvestError::Ledger)?;
        engine_debug!("Opened ledger {:?}", path);
        self.run(file).await
    }

    /// Probe every ID in the configured range and write one ledger line per ID.
    ///
    /// `max_workers` tasks share the backlog and the prober. Results go through
    /// a channel to a single blocking writer that owns `out`.
    pub async fn run<W>(&self, out: W) -> Result<HarvestSummary, HarvestError>
    where
        W: Write + Send + 'static,
    {
        let config = &self.config;
        let total = config.id_count();
        let worker_count = usize::try_from(total)
            .map_or(config.max_workers, |total| config.max_workers.min(total));
        engine_info!(
            "Harvesting ids {}..={} ({} ids) with {} workers",
            config.start_id,
            config.end_id,
            total,
            worker_count
        );

        let (tx, rx) = mpsc::channel::<ProbeResult>(worker_count);
        let ledger = Ledger::new(out, config.order, config.start_id);
        let writer = tokio::task::spawn_blocking(move || drain_results(rx, ledger));

        let backlog = Arc::new(Backlog::new(config.start_id, config.end_id));
        let base_url: Arc<str> = Arc::from(config.base_url.as_str());
        let mut workers = Vec::with_capacity(worker_count);
        for worker_idx in 0..worker_count {
            let backlog = backlog.clone();
            let prober = self.prober.clone();
            let sink = self.sink.clone();
            let base_url = base_url.clone();
            let tx = tx.clone();
            workers.push(tokio::spawn(async move {
                while let Some(id) = backlog.next_id() {
                    let target = ProbeTarget::new(&base_url, id);
                    let result = probe_isolated(prober.clone(), target).await;
                    sink.emit(HarvestEvent::ProbeCompleted(result.clone()));
                    if tx.send(result).await.is_err() {
                        engine_debug!("Worker {} stopping: ledger writer is gone", worker_idx);
                        break;
                    }
                }
            }));
        }
        drop(tx);

        for worker in workers {
            if let Err(err) = worker.await {
                engine_error!("Harvest worker failed: {}", err);
            }
        }

        let stats = writer
            .await
            .map_err(|err| HarvestError::Writer(err.to_string()))?
            .map_err(HarvestError::Ledger)?;

        let summary = HarvestSummary {
            total,
            resolved: stats.resolved,
            failed: stats.written.saturating_sub(stats.resolved),
        };
        engine_info!(
            "Harvest finished: {} ids, {} usernames, {} unknown",
            summary.total,
            summary.resolved,
            summary.failed
        );
        if stats.written != total {
            return Err(HarvestError::Incomplete {
                expected: total,
                written: stats.written,
            });
        }
        Ok(summary)
    }
}

/// Probe once; every failure collapses into an empty username.
pub async fn probe_one(prober: &dyn Prober, target: &ProbeTarget) -> ProbeResult {
    let username = match prober.probe(target).await {
        Ok(response) => {
            let username = response
                .location
                .as_deref()
                .and_then(username_from_location);
            if username.is_none() {
                engine_debug!(
                    "No username for id {} (status {}, location {:?})",
                    target.id,
                    response.status,
                    response.location
                );
            }
            username
        }
        Err(err) => {
            engine_debug!("Probe for id {} failed: {}", target.id, err);
            None
        }
    };
    ProbeResult {
        id: target.id,
        username,
    }
}

/// Run one probe in its own task so a panicking prober only costs that ID.
async fn probe_isolated(prober: Arc<dyn Prober>, target: ProbeTarget) -> ProbeResult {
    let id = target.id;
    match tokio::spawn(async move { probe_one(prober.as_ref(), &target).await }).await {
        Ok(result) => result,
        Err(err) => {
            engine_error!("Probe task for id {} failed: {}", id, err);
            ProbeResult { id, username: None }
        }
    }
}

fn drain_results<W: Write>(
    mut rx: mpsc::Receiver<ProbeResult>,
    mut ledger: Ledger<W>,
) -> io::Result<LedgerStats> {
    while let Some(result) = rx.blocking_recv() {
        ledger.record(result)?;
    }
    let (_, stats) = ledger.finish()?;
    Ok(stats)
}
