use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::store::SessionStore;

/// Background task that periodically removes expired sessions.
///
/// The task holds only an `Arc` to the store and takes the store's lock
/// for each sweep. It runs until [`SessionSweeper::stop`] is called or the
/// handle is dropped.
#[derive(Debug)]
pub struct SessionSweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SessionSweeper {
    /// Spawn the sweeper on the current tokio runtime.
    pub fn start(store: Arc<SessionStore>, interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match store.sweep_expired() {
                            Ok(0) => {}
                            Ok(removed) => tracing::debug!(removed, "swept expired sessions"),
                            Err(e) => tracing::error!(error = %e, "session sweep failed"),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("session sweeper stopped");
        });
        Self { shutdown, handle }
    }

    /// Signal the task to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "session sweeper task failed");
        }
    }
}
