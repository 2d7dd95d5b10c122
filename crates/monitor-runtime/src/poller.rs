//! Roster poller: the background loop that diffs rosters and sends notices.

use std::sync::Arc;
use std::time::Duration;

use monitor_models::{GroupId, MonitorConfig, NoticeKind, RosterDiff, MIN_CHECK_INTERVAL_SECS};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, trace, warn};

use crate::client::{fetch_snapshot, MessagingClient};
use crate::config::RuntimeConfig;
use crate::event::MonitorEvent;
use crate::notifier::Notifier;
use crate::state::{GroupSource, MonitorState};
use crate::store::Applied;

/// What one pass of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    /// Monitoring is switched off; nothing was polled.
    Disabled,
    /// Groups were polled.
    Completed { polled: usize, failures: usize },
    /// A stop was requested mid-cycle.
    Interrupted,
}

/// Polls every tracked group and announces membership changes.
///
/// Cheap to clone: each cycle runs as its own task on a clone so that a
/// panic inside one cycle cannot take the loop down.
#[derive(Clone)]
pub struct RosterPoller {
    state: Arc<MonitorState>,
    client: Arc<dyn MessagingClient>,
    notifier: Arc<Notifier>,
    config: RuntimeConfig,
    events: broadcast::Sender<MonitorEvent>,
    shutdown: watch::Receiver<bool>,
}

impl RosterPoller {
    /// Creates a new poller.
    pub fn new(
        state: Arc<MonitorState>,
        client: Arc<dyn MessagingClient>,
        notifier: Arc<Notifier>,
        config: RuntimeConfig,
        events: broadcast::Sender<MonitorEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            state,
            client,
            notifier,
            config,
            events,
            shutdown,
        }
    }

    /// Run the polling loop until the shutdown signal.
    pub async fn run(self) {
        info!("roster poller started");

        while !self.stop_requested() {
            let pause = match tokio::spawn(self.clone().run_cycle()).await {
                Ok(CycleOutcome::Disabled) => {
                    trace!("monitoring disabled, waiting");
                    self.config.disabled_recheck
                }
                Ok(CycleOutcome::Completed { polled, failures }) => {
                    debug!(polled, failures, "poll cycle finished");
                    self.check_interval().await
                }
                Ok(CycleOutcome::Interrupted) => break,
                Err(e) => {
                    error!(error = %e, "poll cycle aborted, backing off");
                    self.config.error_backoff
                }
            };

            if !self.pause(pause).await {
                break;
            }
        }

        info!("roster poller stopped");
    }

    /// One pass over the working set of groups.
    pub(crate) async fn run_cycle(self) -> CycleOutcome {
        if !self.state.config().await.enable_monitor {
            return CycleOutcome::Disabled;
        }

        let (source, groups) = self.state.working_set().await;
        if groups.is_empty() {
            debug!("no groups to monitor yet");
        }

        let mut polled = 0;
        let mut failures = 0;

        for group in groups {
            if self.stop_requested() {
                return CycleOutcome::Interrupted;
            }
            if group.is_empty() || !self.client.is_group(&group) {
                debug!(group = %group, "skipping non-group chat");
                continue;
            }

            match self.poll_group(&group, source).await {
                Some(true) => polled += 1,
                Some(false) => failures += 1,
                None => return CycleOutcome::Interrupted,
            }
        }

        self.emit(MonitorEvent::CycleCompleted {
            groups: polled,
            failures,
        });
        CycleOutcome::Completed { polled, failures }
    }

    /// Fetches and applies one group's roster.
    ///
    /// Returns `Some(true)` on success, `Some(false)` on a failure that was
    /// skipped, `None` if a stop interrupted the fetch or the notices.
    async fn poll_group(&self, group: &GroupId, source: GroupSource) -> Option<bool> {
        trace!(group = %group, "checking roster");

        let fetch = fetch_snapshot(self.client.as_ref(), group, self.config.request_timeout);
        let result = tokio::select! {
            result = fetch => result,
            _ = stopped(self.shutdown.clone()) => return None,
        };

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(group = %group, error = %e, "failed to fetch roster");
                self.emit(MonitorEvent::FetchFailed {
                    group: group.clone(),
                    error: e.to_string(),
                });
                return Some(false);
            }
        };

        let members = snapshot.len();
        match self.state.apply_roster(group, snapshot, source).await {
            Applied::Rejected => {
                debug!(group = %group, "group untracked during fetch, discarding roster");
            }
            Applied::Baseline => {
                info!(group = %group, members, "recorded baseline roster");
                self.emit(MonitorEvent::BaselineRecorded {
                    group: group.clone(),
                    members,
                });
            }
            Applied::Changed(diff) if diff.is_empty() => {
                trace!(group = %group, members, "roster unchanged");
            }
            Applied::Changed(diff) => {
                info!(
                    group = %group,
                    left = diff.left.len(),
                    joined = diff.joined.len(),
                    members,
                    "roster changed"
                );
                self.announce(group, diff).await;
                if self.stop_requested() {
                    return None;
                }
            }
        }

        Some(true)
    }

    /// Emits events and sends notices for one group's changes.
    async fn announce(&self, group: &GroupId, diff: RosterDiff) {
        let config = self.state.config().await;

        for member in diff.left {
            if self.stop_requested() {
                return;
            }
            info!(group = %group, member = %member.id, name = %member.display_name, "member left");
            self.send_notice(&config, group, NoticeKind::Leave, &member.display_name)
                .await;
            self.emit(MonitorEvent::MemberLeft {
                group: group.clone(),
                member,
            });
        }

        for member in diff.joined {
            if self.stop_requested() {
                return;
            }
            info!(group = %group, member = %member.id, name = %member.display_name, "member joined");
            self.send_notice(&config, group, NoticeKind::Join, &member.display_name)
                .await;
            self.emit(MonitorEvent::MemberJoined {
                group: group.clone(),
                member,
            });
        }
    }

    async fn send_notice(&self, config: &MonitorConfig, group: &GroupId, kind: NoticeKind, name: &str) {
        if !config.notice_enabled(kind) {
            trace!(group = %group, kind = kind.label(), "notice disabled");
            return;
        }
        tokio::select! {
            _ = self.notifier.notify(group, kind, name, config.templates(kind)) => {}
            _ = stopped(self.shutdown.clone()) => {
                debug!(group = %group, kind = kind.label(), "notice abandoned on stop");
            }
        }
    }

    async fn check_interval(&self) -> Duration {
        let secs = self.state.config().await.check_interval;
        Duration::from_secs(secs.max(MIN_CHECK_INTERVAL_SECS))
    }

    /// Sleeps for `duration`. Returns false if a stop was requested instead.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = stopped(self.shutdown.clone()) => false,
        }
    }

    fn stop_requested(&self) -> bool {
        let stop = *self.shutdown.borrow();
        stop || self.shutdown.has_changed().is_err()
    }

    fn emit(&self, event: MonitorEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Resolves once a stop is requested or the sender is gone.
async fn stopped(mut shutdown: watch::Receiver<bool>) {
    loop {
        let stop = *shutdown.borrow_and_update();
        if stop || shutdown.changed().await.is_err() {
            return;
        }
    }
}
