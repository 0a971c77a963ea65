
use engine_logging::engine_info;
use reqwest::header::LOCATION;
use url::Url;

use crate::session::SessionConfig;
use crate::{FailureKind, HarvestError, HarvestEvent, ProbeError, ProbeResponse, ProbeTarget};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

/// Logs one progress line per completed probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::ProbeCompleted(result) => {
                engine_info!(
                    "Crawled id: {}, User: {}",
                    result.id,
                    result.username.as_deref().unwrap_or("N/A")
                );
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: HarvestEvent) {}
}

#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// One attempt against `target`. Redirects are reported, never followed.
    async fn probe(&self, target: &ProbeTarget) -> Result<ProbeResponse, ProbeError>;
}

/// Prober backed by one reqwest client; clones share its connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: reqwest::Client,
}

impl ReqwestProber {
    pub fn new(session: &SessionConfig) -> Result<Self, HarvestError> {
        let headers = session.header_map()?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(session.connect_timeout())
            .timeout(session.timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| HarvestError::Client(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for ReqwestProber {
    async fn probe(&self, target: &ProbeTarget) -> Result<ProbeResponse, ProbeError> {
        let parsed = Url::parse(&target.url)
            .map_err(|err| ProbeError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ProbeError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string());

        Ok(ProbeResponse {
            status: status.as_u16(),
            location,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::new(FailureKind::Timeout, err.to_string());
    }
    ProbeError::new(FailureKind::Network, err.to_string())
}
