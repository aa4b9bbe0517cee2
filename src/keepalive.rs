use crate::backend::BackendClient;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Periodic no-op request against the backend health endpoint so a free-tier
/// instance is never idle long enough to get suspended. Failures are ignored.
pub struct KeepAlivePinger;

impl KeepAlivePinger {
    pub fn spawn(backend: BackendClient, interval: Duration) -> KeepAliveHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if flag.load(Ordering::Relaxed) {
                    debug!("[KeepAlive] Stopped");
                    return;
                }
                if let Err(e) = backend.health().await {
                    debug!("[KeepAlive] Ping failed (ignored): {:?}", e);
                }
            }
        });

        KeepAliveHandle { stopped }
    }
}

/// Idempotent stop switch for the pinger loop.
pub struct KeepAliveHandle {
    stopped: Arc<AtomicBool>,
}

impl KeepAliveHandle {
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::Relaxed) {
            debug!("[KeepAlive] Stop requested");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_idempotent() {
        let handle = KeepAliveHandle {
            stopped: Arc::new(AtomicBool::new(false)),
        };
        assert!(!handle.is_stopped());
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
    }
}
