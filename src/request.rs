use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output formats the backend knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp3,
    Mp4,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(MediaFormat::Mp3),
            "mp4" => Ok(MediaFormat::Mp4),
            other => Err(ClientError::Parse(format!(
                "Unknown format '{}', expected mp3 or mp4",
                other
            ))),
        }
    }
}

//---------------------------------------------------------------------------------
/// A single submission to the backend. Immutable once sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub url: String,
    pub format: MediaFormat,
}

impl ConvertRequest {
    pub fn builder(url: impl Into<String>) -> ConvertRequestBuilder {
        ConvertRequestBuilder {
            url: url.into(),
            format: MediaFormat::Mp4,
        }
    }

    /// Presence check only; anything further is the backend's call.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.url.trim().is_empty() {
            return Err(ClientError::InvalidUrl("URL must not be empty".into()));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}

pub struct ConvertRequestBuilder {
    url: String,
    format: MediaFormat,
}

impl ConvertRequestBuilder {
    pub fn format(mut self, format: MediaFormat) -> Self {
        self.format = format;
        self
    }

    pub fn build(self) -> ConvertRequest {
        ConvertRequest {
            url: self.url,
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_mp4() {
        let request = ConvertRequest::builder("http://example.com/v").build();
        assert_eq!(request.format, MediaFormat::Mp4);
        assert_eq!(request.url, "http://example.com/v");
    }

    #[test]
    fn format_parses_case_insensitive() {
        assert_eq!("MP3".parse::<MediaFormat>().unwrap(), MediaFormat::Mp3);
        assert_eq!("mp4".parse::<MediaFormat>().unwrap(), MediaFormat::Mp4);
        assert!("flac".parse::<MediaFormat>().is_err());
    }

    #[test]
    fn empty_url_is_rejected_locally() {
        let request = ConvertRequest::builder("   ").build();
        assert!(matches!(
            request.validate(),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let request = ConvertRequest::builder("ftp://example.com/v").build();
        assert!(request.validate().is_err());
        let request = ConvertRequest::builder("https://example.com/v").build();
        assert!(request.validate().is_ok());
    }
}
