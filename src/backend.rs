use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::TaskEvent;
use crate::protocol::{CreateTaskBody, CreateTaskResponse, StatusResponse};
use crate::request::ConvertRequest;
use futures_util::StreamExt;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use url::Url;

/// Thin HTTP client over the conversion backend. Cheap to clone; the inner
/// reqwest client is shared.
#[derive(Clone)]
pub struct BackendClient {
    base: String,
    client: Arc<reqwest::Client>,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Arc::new(
            reqwest::Client::builder()
                .connect_timeout(config.connect_timeout)
                .timeout(config.request_timeout)
                .gzip(true)
                .build()
                .map_err(|e| ClientError::Other(format!("Failed to build HTTP client: {}", e)))?,
        );

        Ok(Self {
            base: config.base_url(),
            client,
        })
    }

    /// Submits a conversion request. A single attempt: network failures,
    /// non-2xx responses and `success:false` bodies all terminate here.
    pub async fn create_task(&self, request: &ConvertRequest) -> Result<String, ClientError> {
        let endpoint = format!("{}download", self.base);
        let body = CreateTaskBody::from(request);

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ClientError::Submission(format!("Could not reach backend: {}", e))
            })?;

        let http_status = response.status();
        let parsed: CreateTaskResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Submission(format!("Unexpected backend response: {}", e)))?;

        if !http_status.is_success() || !parsed.success {
            let message = parsed
                .error
                .unwrap_or_else(|| format!("Unexpected backend response ({})", http_status));
            return Err(ClientError::Submission(message));
        }

        parsed
            .task_id
            .ok_or_else(|| ClientError::Submission("Backend returned no task id".into()))
    }

    pub async fn task_status(&self, task_id: &str) -> Result<StatusResponse, ClientError> {
        let endpoint = format!("{}status/{}", self.base, task_id);

        let response = self
            .client
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| ClientError::PollTransport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientError::PollTransport(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<StatusResponse>()
            .await
            .map_err(|e| ClientError::PollTransport(e.to_string()))
    }

    /// Fire-and-forget health check; callers ignore the result.
    pub async fn health(&self) -> Result<(), ClientError> {
        let endpoint = format!("{}health", self.base);
        self.client.get(&endpoint).send().await?;
        Ok(())
    }

    /// Fetches the produced file and streams it into `dest_dir`. The filename
    /// is taken from the URL path with no override; the saved file is not
    /// verified in any way.
    pub async fn fetch_file(
        &self,
        task_id: &str,
        url: &str,
        dest_dir: &Path,
        events: &broadcast::Sender<TaskEvent>,
    ) -> Result<PathBuf, ClientError> {
        let file_name = file_name_from_url(url)?;
        let dest = dest_dir.join(&file_name);

        debug!("[Task {}] Fetching result from {}", task_id, url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Http(
                response.status().as_u16(),
                response.status().to_string(),
            ));
        }

        let total = response.content_length().unwrap_or(0);

        tokio::fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| ClientError::Io(format!("Cannot create '{}': {}", dest_dir.display(), e)))?;
        let mut file = tokio::fs::File::create(&dest).await?;

        let emit_interval = Duration::from_millis(200);
        let mut last_emit = tokio::time::Instant::now();
        let mut received = 0u64;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;

            if last_emit.elapsed() >= emit_interval {
                let _ = events.send(TaskEvent::Downloading {
                    id: task_id.to_string(),
                    received,
                    total,
                });
                last_emit = tokio::time::Instant::now();
            }
        }
        file.flush().await?;

        let _ = events.send(TaskEvent::Downloading {
            id: task_id.to_string(),
            received,
            total,
        });

        info!(
            "[Task {}] Saved {} ({} bytes)",
            task_id,
            dest.display(),
            received
        );
        Ok(dest)
    }
}

/// Last non-empty path segment of the URL, or a fixed fallback when the URL
/// has no usable path.
fn file_name_from_url(url: &str) -> Result<String, ClientError> {
    let parsed = Url::parse(url)?;
    let name = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("download.bin");
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_comes_from_url_path() {
        assert_eq!(
            file_name_from_url("http://x/file/out.mp4").unwrap(),
            "out.mp4"
        );
        assert_eq!(
            file_name_from_url("http://x/a/b/song.mp3?token=1").unwrap(),
            "song.mp3"
        );
    }

    #[test]
    fn file_name_falls_back_when_path_is_empty() {
        assert_eq!(file_name_from_url("http://x/").unwrap(), "download.bin");
        assert_eq!(file_name_from_url("http://x").unwrap(), "download.bin");
    }

    #[test]
    fn file_name_rejects_garbage_url() {
        assert!(file_name_from_url("not a url").is_err());
    }
}
