use crate::config::ClientConfigError;
use std::io;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Connection error while polling: {0}")]
    PollTransport(String),

    #[error("Task {0} failed: {1}")]
    TaskFailed(String, String),

    #[error("HTTP error: {0} {1}")]
    Http(u16, String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("HTTP client error: {0}")]
    Reqwest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Task {0} is canceled")]
    Canceled(String),

    #[error("Task join error: {0}")]
    JoinError(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Reqwest(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<JoinError> for ClientError {
    fn from(err: JoinError) -> Self {
        ClientError::JoinError(err.to_string())
    }
}

impl From<ClientConfigError> for ClientError {
    fn from(err: ClientConfigError) -> Self {
        ClientError::ConfigError(err.to_string())
    }
}

impl From<String> for ClientError {
    fn from(s: String) -> Self {
        ClientError::Other(s)
    }
}

impl From<&str> for ClientError {
    fn from(s: &str) -> Self {
        ClientError::Other(s.to_string())
    }
}
