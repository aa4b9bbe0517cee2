use crate::backend::BackendClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::TaskEvent;
use crate::status::TaskState;
use crate::task::ConvertTask;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const QUEUED_MESSAGE: &str = "Waiting in queue...";
const PROCESSING_MESSAGE: &str = "Processing...";
const CONNECTIVITY_MESSAGE: &str = "Could not check task status";

/// How a poll loop ended. Exactly one of these is produced per watched task.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Completed { download_url: String },
    Failed(ClientError),
    Canceled,
}

/// Fixed-interval status poll for one task. Queries are strictly sequential:
/// each tick awaits its response before the next tick is taken, so a slow
/// backend can never produce overlapping in-flight queries.
pub struct StatusPoller {
    backend: BackendClient,
    config: Arc<ClientConfig>,
    task: Arc<ConvertTask>,
    events: broadcast::Sender<TaskEvent>,
    canceled: Arc<AtomicBool>,
}

impl StatusPoller {
    pub fn new(
        backend: BackendClient,
        config: Arc<ClientConfig>,
        task: Arc<ConvertTask>,
        events: broadcast::Sender<TaskEvent>,
    ) -> Self {
        Self {
            backend,
            config,
            task,
            events,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn spawn(self) -> PollHandle {
        let task_id = self.task.id.clone();
        let canceled = Arc::clone(&self.canceled);
        let join = tokio::spawn(self.run());
        PollHandle {
            task_id,
            canceled,
            join,
        }
    }

    async fn run(self) -> PollOutcome {
        let id = self.task.id.clone();
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately; consume it so the first
        // query lands one interval after submission
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if self.canceled.load(Ordering::Relaxed) {
                debug!("[Task {}] Poll loop canceled", id);
                return PollOutcome::Canceled;
            }

            let response = match self.backend.task_status(&id).await {
                Ok(response) => response,
                // no retry: one failed query aborts the whole task
                Err(e) => {
                    debug!("[Task {}] Status query failed: {:?}", id, e);
                    return self.fail(ClientError::PollTransport(format!(
                        "{}: {}",
                        CONNECTIVITY_MESSAGE, e
                    )));
                }
            };

            let state = match self.task.apply_status(&response) {
                Ok(state) => state,
                Err(e) => {
                    debug!("[Task {}] Unparseable status response: {:?}", id, e);
                    return self.fail(ClientError::PollTransport(format!(
                        "{}: {}",
                        CONNECTIVITY_MESSAGE, e
                    )));
                }
            };

            debug!("[Task {}] Observed state {}", id, state);

            match state {
                TaskState::Pending => {
                    self.emit_progress(state, QUEUED_MESSAGE.to_string());
                }
                TaskState::InProgress => {
                    let message = self
                        .task
                        .progress_hint()
                        .unwrap_or_else(|| PROCESSING_MESSAGE.to_string());
                    self.emit_progress(state, message);
                }
                TaskState::Succeeded => {
                    self.emit_progress(state, "Conversion complete".to_string());

                    let Some(download_url) = self.task.result_url.get().cloned() else {
                        return self.fail(ClientError::Backend(
                            "SUCCESS status carried no download URL".into(),
                        ));
                    };

                    // brief pause so the full bar is visible before the
                    // download starts, mirroring the page behavior
                    tokio::time::sleep(self.config.success_delay).await;
                    if self.canceled.load(Ordering::Relaxed) {
                        debug!("[Task {}] Canceled during success delay", id);
                        return PollOutcome::Canceled;
                    }

                    info!("[Task {}] Succeeded, result at {}", id, download_url);
                    let _ = self.events.send(TaskEvent::Complete {
                        id,
                        download_url: download_url.clone(),
                    });
                    return PollOutcome::Completed { download_url };
                }
                TaskState::Failed => {
                    let message = self
                        .task
                        .error_message()
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return self.fail(ClientError::TaskFailed(id, message));
                }
            }
        }
    }

    fn emit_progress(&self, state: TaskState, message: String) {
        let _ = self.events.send(TaskEvent::Progress {
            id: self.task.id.clone(),
            percent: state.progress_percent(),
            message,
        });
    }

    fn fail(&self, err: ClientError) -> PollOutcome {
        let _ = self
            .events
            .send(TaskEvent::Error(self.task.id.clone(), err.clone()));
        PollOutcome::Failed(err)
    }
}

/// Cancellable handle over a running poll loop. `cancel` is explicit and
/// idempotent; the loop observes the flag on its next tick.
pub struct PollHandle {
    task_id: String,
    canceled: Arc<AtomicBool>,
    join: JoinHandle<PollOutcome>,
}

impl PollHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(&self) {
        if !self.canceled.swap(true, Ordering::Relaxed) {
            debug!("[Task {}] Poll cancel requested", self.task_id);
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Relaxed)
    }

    /// Shared cancel flag, used by the manager for shutdown.
    pub(crate) fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.canceled)
    }

    pub async fn join(self) -> Result<PollOutcome, ClientError> {
        self.join.await.map_err(ClientError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let handle = PollHandle {
            task_id: "abc".into(),
            canceled: Arc::new(AtomicBool::new(false)),
            join: tokio::spawn(async { PollOutcome::Canceled }),
        };

        assert!(!handle.is_canceled());
        handle.cancel();
        handle.cancel();
        handle.cancel();
        assert!(handle.is_canceled());

        let outcome = handle.join().await.unwrap();
        assert!(matches!(outcome, PollOutcome::Canceled));
    }
}
