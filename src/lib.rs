pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod keepalive;
pub mod manager;
pub mod poller;
pub mod progress;
pub mod protocol;
pub mod request;
pub mod status;
pub mod task;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::ClientError;
pub use status::TaskState;

pub use events::TaskEvent;
pub use manager::ConvertManager;
pub use poller::{PollHandle, PollOutcome};
pub use request::{ConvertRequest, MediaFormat};
