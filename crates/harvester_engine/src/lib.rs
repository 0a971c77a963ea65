//! Harvester engine: concurrent username probing over a numeric ID range.
mod harvest;
mod ledger;
mod probe;
mod session;
mod types;
mod username;

pub use harvest::{
    probe_one, HarvestConfig, HarvestError, Harvester, DEFAULT_BASE_URL, DEFAULT_MAX_WORKERS,
};
pub use ledger::{open_ledger, Ledger, LedgerOrder, LedgerStats};
pub use probe::{LogProgressSink, NullProgressSink, Prober, ProgressSink, ReqwestProber};
pub use session::{SessionConfig, SessionError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
pub use types::{
    FailureKind, HarvestEvent, HarvestSummary, ProbeError, ProbeResponse, ProbeResult,
    ProbeTarget, UserId,
};
pub use username::username_from_location;
