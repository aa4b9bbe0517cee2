use crate::ClientError;

#[derive(Debug, Clone)]
pub enum TaskEvent {
    Submitted(String),
    Progress {
        id: String,
        percent: u8,
        message: String,
    },
    Complete {
        id: String,
        download_url: String,
    },
    Downloading {
        id: String,
        received: u64,
        total: u64,
    },
    Downloaded {
        id: String,
        path: std::path::PathBuf,
    },
    Error(String, ClientError),
}
