//! Shared request configuration for a harvest run.
//!
//! A [`SessionConfig`] is assembled once (defaults, optional RON file, command
//! line overrides) and then only read. Workers see it through the prober's
//! client, never through a global.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse session file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid header {0:?}, expected \"Name: value\"")]
    InvalidHeader(String),
    #[error("invalid cookie {0:?}, expected \"name=value\"")]
    InvalidCookie(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
        Self {
            headers,
            cookies: BTreeMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = fs::read_to_string(path).map_err(|source| SessionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|err| SessionError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Add or replace a header from `Name: value`.
    pub fn set_header_arg(&mut self, raw: &str) -> Result<(), SessionError> {
        let (name, value) = raw
            .split_once(':')
            .map(|(n, v)| (n.trim(), v.trim()))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| SessionError::InvalidHeader(raw.to_string()))?;
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| SessionError::InvalidHeader(raw.to_string()))?;
        HeaderValue::from_str(value).map_err(|_| SessionError::InvalidHeader(raw.to_string()))?;
        // Header names are case-insensitive; drop any differently-cased entry.
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// Add or replace a cookie from `name=value`.
    pub fn set_cookie_arg(&mut self, raw: &str) -> Result<(), SessionError> {
        let (name, value) = raw
            .split_once('=')
            .map(|(n, v)| (n.trim(), v.trim()))
            .filter(|(n, _)| !n.is_empty())
            .ok_or_else(|| SessionError::InvalidCookie(raw.to_string()))?;
        self.cookies.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Cookies joined as a single `Cookie` header value, sorted by name.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let joined = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(joined)
    }

    pub fn header_map(&self) -> Result<HeaderMap, SessionError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let invalid = || SessionError::InvalidHeader(format!("{name}: {value}"));
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        if let Some(cookies) = self.cookie_header() {
            let value = HeaderValue::from_str(&cookies)
                .map_err(|_| SessionError::InvalidCookie(cookies.clone()))?;
            map.insert(COOKIE, value);
        }
        Ok(map)
    }
}
