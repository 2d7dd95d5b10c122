//! State shared between the poll loop and command handlers.

use monitor_models::{GroupId, MonitorConfig, RosterSnapshot};
use monitor_persistence::ConfigStore;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::store::{Applied, RosterStore};

/// Where a polled group came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSource {
    /// The explicit `monitor_groups` list.
    Listed,
    /// Groups with a snapshot, used while the list is empty.
    Seen,
}

/// Configuration plus roster store, each behind its own lock.
///
/// Config mutations go through [`MonitorState::update_config`], which saves
/// the document before releasing the write guard.
pub struct MonitorState {
    config: RwLock<MonitorConfig>,
    config_store: ConfigStore,
    rosters: RosterStore,
}

impl MonitorState {
    /// Loads the config from `config_store`, writing defaults if absent.
    pub fn load(config_store: ConfigStore) -> Result<Self> {
        let config = config_store.load_or_init()?;
        Ok(Self::with_config(config, config_store))
    }

    /// Creates state from an already loaded config.
    pub fn with_config(config: MonitorConfig, config_store: ConfigStore) -> Self {
        Self {
            config: RwLock::new(config),
            config_store,
            rosters: RosterStore::new(),
        }
    }

    /// Returns a copy of the current config.
    pub async fn config(&self) -> MonitorConfig {
        self.config.read().await.clone()
    }

    /// Applies `f` to the config and persists the result.
    ///
    /// If saving fails the in-memory config is rolled back, so memory and
    /// disk never disagree.
    pub async fn update_config<T>(&self, f: impl FnOnce(&mut MonitorConfig) -> T) -> Result<T> {
        let mut config = self.config.write().await;
        let previous = config.clone();
        let out = f(&mut *config);

        if *config == previous {
            return Ok(out);
        }

        if let Err(e) = self.config_store.save(&config) {
            warn!(error = %e, "failed to persist monitor config, rolling back");
            *config = previous;
            return Err(e.into());
        }

        debug!("monitor config updated");
        Ok(out)
    }

    /// The roster store.
    pub fn rosters(&self) -> &RosterStore {
        &self.rosters
    }

    /// Groups to poll this cycle and where they came from.
    ///
    /// The explicit list when configured, otherwise every group that already
    /// has a snapshot.
    pub async fn working_set(&self) -> (GroupSource, Vec<GroupId>) {
        let listed = self.config.read().await.monitor_groups.clone();
        if listed.is_empty() {
            (GroupSource::Seen, self.rosters.groups().await)
        } else {
            (GroupSource::Listed, listed)
        }
    }

    /// Stores a polled roster if the group is still tracked.
    ///
    /// A group taken from the explicit list must still be listed; a group
    /// taken from the seen groups must still have a snapshot and must not have
    /// been displaced by an explicit list. The config read guard is held
    /// across the check and the replace.
    pub async fn apply_roster(
        &self,
        group: &GroupId,
        snapshot: RosterSnapshot,
        source: GroupSource,
    ) -> Applied {
        let config = self.config.read().await;
        let listed = config.is_listed(group);
        let list_empty = config.monitor_groups.is_empty();

        let applied = self
            .rosters
            .apply_if(group, snapshot, |current| match source {
                GroupSource::Listed => listed,
                GroupSource::Seen => current.is_some() && (list_empty || listed),
            })
            .await;

        drop(config);
        applied
    }
}
