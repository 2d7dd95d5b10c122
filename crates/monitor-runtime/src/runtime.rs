//! Main runtime manager.

use std::sync::Arc;

use monitor_models::{GroupId, RosterSnapshot};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{fetch_snapshot, MessagingClient};
use crate::config::RuntimeConfig;
use crate::error::{MonitorError, Result};
use crate::event::MonitorEvent;
use crate::notifier::Notifier;
use crate::poller::RosterPoller;
use crate::state::MonitorState;

/// The spawned poll loop and its stop signal.
struct Worker {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

/// Owns the shared state and the background poll loop.
///
/// Command handlers call into this from the host's dispatch path while the
/// loop runs concurrently; all shared data lives in [`MonitorState`].
pub struct MonitorRuntime {
    state: Arc<MonitorState>,
    client: Arc<dyn MessagingClient>,
    notifier: Arc<Notifier>,
    config: RuntimeConfig,
    event_tx: broadcast::Sender<MonitorEvent>,
    worker: Mutex<Option<Worker>>,
}

impl MonitorRuntime {
    /// Creates a runtime. The poll loop is not started.
    pub fn new(
        state: Arc<MonitorState>,
        client: Arc<dyn MessagingClient>,
        config: RuntimeConfig,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(Arc::clone(&client), config.request_timeout));
        let (event_tx, _) = broadcast::channel(256);

        Self {
            state,
            client,
            notifier,
            config,
            event_tx,
            worker: Mutex::new(None),
        }
    }

    /// Returns the shared state.
    pub fn state(&self) -> &Arc<MonitorState> {
        &self.state
    }

    /// Returns the messaging client.
    pub fn client(&self) -> &Arc<dyn MessagingClient> {
        &self.client
    }

    /// Returns the runtime tuning.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Subscribe to runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Starts the poll loop. Returns false if it was already running.
    pub async fn start(&self) -> bool {
        let mut worker = self.worker.lock().await;
        if let Some(previous) = worker.as_mut() {
            if !previous.handle.is_finished() {
                if !*previous.shutdown_tx.borrow() {
                    debug!("monitor already running");
                    return false;
                }
                // A stop timed out earlier; only one loop may run at a time.
                debug!("waiting for the previous poll loop to exit");
                let _ = previous.shutdown_tx.send(true);
                if let Err(e) = (&mut previous.handle).await {
                    warn!(error = %e, "previous poll loop ended abnormally");
                }
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = RosterPoller::new(
            Arc::clone(&self.state),
            Arc::clone(&self.client),
            Arc::clone(&self.notifier),
            self.config.clone(),
            self.event_tx.clone(),
            shutdown_rx,
        );
        let handle = tokio::spawn(poller.run());

        *worker = Some(Worker {
            handle,
            shutdown_tx,
        });
        info!("monitor started");
        true
    }

    /// Signals the poll loop to stop and waits for it, up to the stop timeout.
    ///
    /// The loop is never aborted. If it does not exit in time it stays
    /// registered, so [`is_running`](Self::is_running) keeps reporting it and
    /// the next [`start`](Self::start) waits for it. Returns false if it was
    /// not running.
    pub async fn stop(&self) -> bool {
        let mut slot = self.worker.lock().await;
        let Some(worker) = slot.as_mut() else {
            return false;
        };

        let _ = worker.shutdown_tx.send(true);

        match tokio::time::timeout(self.config.stop_timeout, &mut worker.handle).await {
            Ok(result) => {
                match result {
                    Ok(()) => info!("monitor stopped"),
                    Err(e) => warn!(error = %e, "poll loop ended abnormally"),
                }
                *slot = None;
            }
            Err(_) => warn!(
                timeout_ms = self.config.stop_timeout.as_millis() as u64,
                "poll loop did not stop in time, still winding down"
            ),
        }
        true
    }

    /// Returns true while the poll loop task is alive.
    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Fetches a group's roster under the request timeout.
    pub async fn fetch(&self, group: &GroupId) -> Result<RosterSnapshot> {
        Ok(fetch_snapshot(self.client.as_ref(), group, self.config.request_timeout).await?)
    }

    /// Re-fetches a group and replaces its snapshot without notifications.
    ///
    /// Returns the new member count.
    pub async fn refresh_group(&self, group: &GroupId) -> Result<usize> {
        let snapshot = self.fetch(group).await?;
        let members = snapshot.len();
        self.state.rosters().insert(group.clone(), snapshot).await;
        info!(group = %group, members, "refreshed roster");
        Ok(members)
    }

    /// Records a baseline for a group and adds it to the explicit list.
    ///
    /// Returns the member count.
    pub async fn track_group(&self, group: &GroupId) -> Result<usize> {
        if group.is_empty() || !self.client.is_group(group) {
            return Err(MonitorError::NotAGroup(group.to_string()));
        }

        let snapshot = self.fetch(group).await?;
        let members = snapshot.len();
        self.state.rosters().insert(group.clone(), snapshot).await;
        self.state
            .update_config(|c| c.add_group(group.clone()))
            .await?;

        info!(group = %group, members, "added group to monitoring");
        Ok(members)
    }

    /// Removes a group from the explicit list and drops its snapshot.
    ///
    /// Returns false if the group was not listed.
    pub async fn untrack_group(&self, group: &GroupId) -> Result<bool> {
        let removed = self.state.update_config(|c| c.remove_group(group)).await?;
        if removed {
            self.state.rosters().remove(group).await;
            info!(group = %group, "removed group from monitoring");
        }
        Ok(removed)
    }
}

impl Drop for MonitorRuntime {
    fn drop(&mut self) {
        // Signal the loop if still running.
        if let Some(worker) = self.worker.get_mut() {
            let _ = worker.shutdown_tx.send(true);
        }
    }
}
