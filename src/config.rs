use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend_url: String,
    pub download_dir: PathBuf,
    pub debug: bool,
    /// Period between status queries for one task.
    pub poll_interval: Duration,
    /// Pause between observing SUCCESS and fetching the produced file.
    pub success_delay: Duration,
    /// Period between fire-and-forget health pings.
    pub keepalive_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:10000".to_string(),
            download_dir: PathBuf::from("downloads"),
            debug: false,
            poll_interval: Duration::from_secs(2),
            success_delay: Duration::from_secs(1),
            keepalive_interval: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            inner: ClientConfig::default(),
        }
    }

    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.inner.backend_url = url.into();
        self
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.download_dir = dir.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.inner.poll_interval = interval;
        self
    }

    pub fn success_delay(mut self, delay: Duration) -> Self {
        self.inner.success_delay = delay;
        self
    }

    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.inner.keepalive_interval = interval;
        self
    }

    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.inner.connect_timeout = Duration::from_secs(secs);
        self
    }

    pub fn request_timeout(mut self, secs: u64) -> Self {
        self.inner.request_timeout = Duration::from_secs(secs);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.inner.debug = debug;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum ClientConfigError {
    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),
    #[error("Invalid download directory: {0}")]
    InvalidDownloadDir(String),
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ClientConfigError> {
        let parsed = Url::parse(&self.backend_url)
            .map_err(|e| ClientConfigError::InvalidBackendUrl(format!("{}: {}", self.backend_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientConfigError::InvalidBackendUrl(
                self.backend_url.clone(),
            ));
        }

        if !self.download_dir.to_str().map_or(false, |s| !s.is_empty()) {
            return Err(ClientConfigError::InvalidDownloadDir(
                self.download_dir.to_string_lossy().to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(ClientConfigError::InvalidInterval(
                "poll_interval must be non-zero".into(),
            ));
        }

        if self.keepalive_interval.is_zero() {
            return Err(ClientConfigError::InvalidInterval(
                "keepalive_interval must be non-zero".into(),
            ));
        }

        Ok(())
    }

    /// Backend base address, normalized to end with a slash so endpoint
    /// paths can be appended directly.
    pub fn base_url(&self) -> String {
        let mut base = self.backend_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        base
    }

    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

impl FromStr for ClientConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
