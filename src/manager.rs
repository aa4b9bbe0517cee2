use crate::backend::BackendClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::TaskEvent;
use crate::keepalive::{KeepAliveHandle, KeepAlivePinger};
use crate::poller::{PollHandle, PollOutcome, StatusPoller};
use crate::request::ConvertRequest;
use crate::task::ConvertTask;
use dashmap::DashMap;
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, OnceCell};

/// Orchestrates the submit / poll / fetch lifecycle against one backend.
/// Holds every task submitted during this process run; nothing survives a
/// restart.
pub struct ConvertManager {
    pub config: Arc<ClientConfig>,
    pub tasks: Arc<DashMap<String, Arc<ConvertTask>>>,
    backend: BackendClient,
    keepalive: OnceCell<KeepAliveHandle>,
    poll_flags: DashMap<String, Arc<AtomicBool>>,
    event_tx: broadcast::Sender<TaskEvent>,
}

impl ConvertManager {
    pub fn new(config: ClientConfig) -> Result<Arc<Self>, ClientError> {
        config.validate()?;
        let backend = BackendClient::new(&config)?;
        let (event_tx, _) = broadcast::channel(100);

        Ok(Arc::new(Self {
            config: Arc::new(config),
            tasks: Arc::new(DashMap::new()),
            backend,
            keepalive: OnceCell::new(),
            poll_flags: DashMap::new(),
            event_tx,
        }))
    }

    /// Starts the background keep-alive pinger. Call once.
    pub fn init(self: &Arc<Self>) -> Result<(), ClientError> {
        let handle = KeepAlivePinger::spawn(self.backend.clone(), self.config.keepalive_interval);
        self.keepalive
            .set(handle)
            .map_err(|_| ClientError::ConfigError("Keep-alive already started".into()))?;
        debug!(
            "[Manager] Keep-alive started (every {:?})",
            self.config.keepalive_interval
        );
        Ok(())
    }

    /// Submits a request to the backend. A single attempt; on any failure no
    /// task is registered and no polling ever starts.
    pub async fn submit(self: &Arc<Self>, request: ConvertRequest) -> Result<Arc<ConvertTask>, ClientError> {
        request.validate()?;

        let task_id = self.backend.create_task(&request).await?;
        info!(
            "[Manager] Submitted '{}' as task {} ({})",
            request.url, task_id, request.format
        );

        let task = Arc::new(ConvertTask::new(
            task_id.clone(),
            request.url,
            request.format,
        ));
        self.tasks.insert(task_id.clone(), Arc::clone(&task));

        let _ = self.event_tx.send(TaskEvent::Submitted(task_id));
        Ok(task)
    }

    /// Spawns the status poll loop for a submitted task.
    pub fn watch(self: &Arc<Self>, task_id: &str) -> Result<PollHandle, ClientError> {
        let task = self
            .get_task(task_id)
            .ok_or_else(|| ClientError::TaskNotFound(task_id.to_string()))?;

        let poller = StatusPoller::new(
            self.backend.clone(),
            Arc::clone(&self.config),
            task,
            self.event_tx.clone(),
        );
        let handle = poller.spawn();
        self.poll_flags
            .insert(task_id.to_string(), handle.cancel_flag());
        Ok(handle)
    }

    /// Submit, poll to a terminal state, and on success fetch the produced
    /// file into the configured download directory.
    pub async fn run_to_completion(
        self: &Arc<Self>,
        request: ConvertRequest,
    ) -> Result<PathBuf, ClientError> {
        let task = self.submit(request).await?;
        let task_id = task.id.clone();
        let handle = self.watch(&task_id)?;

        let outcome = handle.join().await?;
        self.poll_flags.remove(&task_id);

        match outcome {
            PollOutcome::Completed { download_url } => {
                let fetched = self
                    .backend
                    .fetch_file(
                        &task_id,
                        &download_url,
                        &self.config.download_dir,
                        &self.event_tx,
                    )
                    .await;
                match fetched {
                    Ok(path) => {
                        let _ = self.event_tx.send(TaskEvent::Downloaded {
                            id: task_id,
                            path: path.clone(),
                        });
                        Ok(path)
                    }
                    Err(err) => {
                        error!("[Task {}] Result fetch failed: {}", task_id, err);
                        let _ = self
                            .event_tx
                            .send(TaskEvent::Error(task_id, err.clone()));
                        Err(err)
                    }
                }
            }
            PollOutcome::Failed(err) => {
                error!("[Task {}] Terminated with error: {}", task_id, err);
                Err(err)
            }
            PollOutcome::Canceled => Err(ClientError::Canceled(task_id)),
        }
    }

    pub fn get_task(&self, id: &str) -> Option<Arc<ConvertTask>> {
        self.tasks.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn get_task_by_url(&self, url: &str) -> Option<Arc<ConvertTask>> {
        self.tasks
            .iter()
            .find(|entry| entry.value().url == url)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn all_tasks(&self) -> Vec<Arc<ConvertTask>> {
        self.tasks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_tx.subscribe()
    }

    /// Stops the keep-alive pinger and cancels every live poll loop. Safe to
    /// call more than once.
    pub fn shutdown(&self) {
        if let Some(handle) = self.keepalive.get() {
            handle.stop();
        }
        for entry in self.poll_flags.iter() {
            if !entry.value().swap(true, Ordering::Relaxed) {
                debug!("[Manager] Canceled poll for task {}", entry.key());
            }
        }
    }
}
