//! In-memory roster store.

use std::collections::HashMap;

use monitor_models::{GroupId, RosterDiff, RosterSnapshot};
use tokio::sync::RwLock;

/// Result of a conditional snapshot replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The group had no snapshot; the new one is the baseline.
    Baseline,
    /// The snapshot was replaced; the change since the old one.
    Changed(RosterDiff),
    /// The snapshot was not stored.
    Rejected,
}

/// Latest roster snapshot per group.
///
/// Every replace happens under one write guard, so a diff is always computed
/// against the snapshot it supersedes.
#[derive(Debug, Default)]
pub struct RosterStore {
    rosters: RwLock<HashMap<GroupId, RosterSnapshot>>,
}

impl RosterStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a group's snapshot and returns the change since the old one.
    ///
    /// Returns `None` when the group had no snapshot yet (first observation).
    pub async fn apply(&self, group: &GroupId, snapshot: RosterSnapshot) -> Option<RosterDiff> {
        let mut rosters = self.rosters.write().await;
        let diff = rosters.get(group).map(|old| old.diff(&snapshot));
        rosters.insert(group.clone(), snapshot);
        diff
    }

    /// Like [`RosterStore::apply`], but only if `accept` approves.
    ///
    /// `accept` sees the current snapshot and runs under the same write guard
    /// as the replace.
    pub async fn apply_if(
        &self,
        group: &GroupId,
        snapshot: RosterSnapshot,
        accept: impl FnOnce(Option<&RosterSnapshot>) -> bool,
    ) -> Applied {
        let mut rosters = self.rosters.write().await;
        let current = rosters.get(group);
        if !accept(current) {
            return Applied::Rejected;
        }
        let applied = match current {
            Some(old) => Applied::Changed(old.diff(&snapshot)),
            None => Applied::Baseline,
        };
        rosters.insert(group.clone(), snapshot);
        applied
    }

    /// Replaces a group's snapshot without computing a diff.
    pub async fn insert(&self, group: GroupId, snapshot: RosterSnapshot) -> Option<RosterSnapshot> {
        self.rosters.write().await.insert(group, snapshot)
    }

    /// Drops a group's snapshot.
    pub async fn remove(&self, group: &GroupId) -> Option<RosterSnapshot> {
        self.rosters.write().await.remove(group)
    }

    /// Returns a copy of a group's snapshot.
    pub async fn get(&self, group: &GroupId) -> Option<RosterSnapshot> {
        self.rosters.read().await.get(group).cloned()
    }

    /// Returns true if the group has a snapshot.
    pub async fn contains(&self, group: &GroupId) -> bool {
        self.rosters.read().await.contains_key(group)
    }

    /// Number of recorded members of a group (0 if unknown).
    pub async fn member_count(&self, group: &GroupId) -> usize {
        self.rosters
            .read()
            .await
            .get(group)
            .map_or(0, RosterSnapshot::len)
    }

    /// All groups with a snapshot, sorted.
    pub async fn groups(&self) -> Vec<GroupId> {
        let mut groups: Vec<GroupId> = self.rosters.read().await.keys().cloned().collect();
        groups.sort();
        groups
    }

    /// Returns `(groups, members)` totals.
    pub async fn totals(&self) -> (usize, usize) {
        let rosters = self.rosters.read().await;
        let members = rosters.values().map(RosterSnapshot::len).sum();
        (rosters.len(), members)
    }
}
