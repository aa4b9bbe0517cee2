use crate::request::ConvertRequest;
use serde::{Deserialize, Serialize};

/// Body for `POST /download`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskBody {
    pub url: String,
    pub format: String,
}

impl From<&ConvertRequest> for CreateTaskBody {
    fn from(request: &ConvertRequest) -> Self {
        Self {
            url: request.url.clone(),
            format: request.format.as_str().to_string(),
        }
    }
}

/// Response of `POST /download`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskResponse {
    pub success: bool,
    pub task_id: Option<String>,
    pub error: Option<String>,
}

/// Response of `GET /status/{task_id}`. `download_url` is only present on
/// SUCCESS, `error` only on FAILURE; neither is enforced by the backend so
/// both stay optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub state: String,
    pub status: Option<String>,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MediaFormat;

    #[test]
    fn create_body_serializes_lowercase_format() {
        let request = ConvertRequest::builder("http://x/video")
            .format(MediaFormat::Mp3)
            .build();
        let body = CreateTaskBody::from(&request);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["url"], "http://x/video");
        assert_eq!(json["format"], "mp3");
    }

    #[test]
    fn create_response_with_task_id() {
        let parsed: CreateTaskResponse =
            serde_json::from_str(r#"{"success": true, "task_id": "abc"}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.task_id.as_deref(), Some("abc"));
        assert!(parsed.error.is_none());
    }

    #[test]
    fn create_response_with_error() {
        let parsed: CreateTaskResponse =
            serde_json::from_str(r#"{"success": false, "error": "bad url"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("bad url"));
    }

    #[test]
    fn status_response_success_carries_download_url() {
        let parsed: StatusResponse = serde_json::from_str(
            r#"{"state": "SUCCESS", "download_url": "http://x/out.mp4"}"#,
        )
        .unwrap();
        assert_eq!(parsed.state, "SUCCESS");
        assert_eq!(parsed.download_url.as_deref(), Some("http://x/out.mp4"));
    }

    #[test]
    fn status_response_progress_carries_status_text() {
        let parsed: StatusResponse =
            serde_json::from_str(r#"{"state": "PROGRESS", "status": "Converting audio"}"#).unwrap();
        assert_eq!(parsed.state, "PROGRESS");
        assert_eq!(parsed.status.as_deref(), Some("Converting audio"));
        assert!(parsed.download_url.is_none());
    }
}
