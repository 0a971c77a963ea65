use std::fmt;

pub type UserId = u64;

/// One probe: the numeric ID and the URL derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub id: UserId,
    pub url: String,
}

impl ProbeTarget {
    /// `{base_url}.{id}/`
    pub fn new(base_url: &str, id: UserId) -> Self {
        Self {
            id,
            url: format!("{base_url}.{id}/"),
        }
    }
}

/// Outcome of one probe. `username` is `None` for every kind of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub id: UserId,
    pub username: Option<String>,
}

/// The parts of a probe response the harvester reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    ProbeCompleted(ProbeResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestSummary {
    pub total: u64,
    pub resolved: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError {
    pub kind: FailureKind,
    pub message: String,
}

impl ProbeError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ProbeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
