use crate::error::ClientError;
use crate::protocol::StatusResponse;
use crate::request::MediaFormat;
use crate::status::TaskState;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use tokio::sync::OnceCell;

/// Client-side mirror of a backend task. The backend owns the real state;
/// this record only reflects what polling has observed so far. Terminal
/// states are assumed never to revert.
pub struct ConvertTask {
    pub id: String,
    pub url: String,
    pub format: MediaFormat,
    pub created_at: DateTime<Utc>,

    state: Mutex<TaskState>,
    progress_hint: Mutex<Option<String>>,
    error_message: Mutex<Option<String>>,
    updated_at: Mutex<DateTime<Utc>>,
    pub result_url: OnceCell<String>,
}

impl ConvertTask {
    pub fn new(id: String, url: String, format: MediaFormat) -> Self {
        let now = Utc::now();
        Self {
            id,
            url,
            format,
            created_at: now,
            state: Mutex::new(TaskState::Pending),
            progress_hint: Mutex::new(None),
            error_message: Mutex::new(None),
            updated_at: Mutex::new(now),
            result_url: OnceCell::new(),
        }
    }

    pub fn state(&self) -> TaskState {
        *self.state.lock().unwrap()
    }

    pub fn progress_hint(&self) -> Option<String> {
        self.progress_hint.lock().unwrap().clone()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_message.lock().unwrap().clone()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        *self.updated_at.lock().unwrap()
    }

    /// Folds one status observation into the record and returns the parsed
    /// state. An unrecognized state string is a parse failure; the caller
    /// treats it like any other transport error.
    pub fn apply_status(&self, response: &StatusResponse) -> Result<TaskState, ClientError> {
        let state = TaskState::from_str(&response.state)
            .map_err(|_| ClientError::Parse(format!("Unknown task state '{}'", response.state)))?;

        *self.state.lock().unwrap() = state;
        *self.updated_at.lock().unwrap() = Utc::now();

        if let Some(hint) = &response.status {
            *self.progress_hint.lock().unwrap() = Some(hint.clone());
        }
        if let Some(error) = &response.error {
            *self.error_message.lock().unwrap() = Some(error.clone());
        }
        if let Some(url) = &response.download_url {
            let _ = self.result_url.set(url.clone());
        }

        Ok(state)
    }
}

impl fmt::Debug for ConvertTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertTask")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("format", &self.format)
            .field("state", &self.state())
            .field("result_url", &self.result_url.get())
            .finish()
    }
}
