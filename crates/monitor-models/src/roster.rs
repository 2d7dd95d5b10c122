//! Roster snapshots and membership diffs.
//!
//! A [`RosterSnapshot`] is the full member list of one group at one point in
//! time. Snapshots are never merged: each poll replaces the previous one, and
//! [`RosterSnapshot::diff`] reports who left and who arrived in between.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MemberId;

/// A single group member as reported by the messaging client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    /// Stable member identifier.
    pub id: MemberId,
    /// Name shown in notifications.
    pub display_name: String,
}

impl Member {
    /// Creates a new member.
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Picks the best display name for a member.
    ///
    /// Group-specific display names win over account nicknames; when both are
    /// blank the member ID is used.
    pub fn resolve_name(id: &MemberId, display_name: Option<&str>, nickname: Option<&str>) -> String {
        [display_name, nickname]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }
}

/// The roster of one group at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Member ID to display name.
    pub members: HashMap<MemberId, String>,
    /// When the roster was fetched.
    pub observed_at: DateTime<Utc>,
}

impl RosterSnapshot {
    /// Builds a snapshot from a fetched member list.
    ///
    /// If an ID appears more than once the last entry wins.
    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Self {
        Self {
            members: members
                .into_iter()
                .map(|m| (m.id, m.display_name))
                .collect(),
            observed_at: Utc::now(),
        }
    }

    /// Number of members in the snapshot.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the snapshot has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if the member is present.
    pub fn contains(&self, id: &MemberId) -> bool {
        self.members.contains_key(id)
    }

    /// Looks up a member's display name.
    pub fn name_of(&self, id: &MemberId) -> Option<&str> {
        self.members.get(id).map(String::as_str)
    }

    /// Computes the membership change from `self` (older) to `newer`.
    ///
    /// Departed members carry the name from `self`, arrivals carry the name
    /// from `newer`.
    pub fn diff(&self, newer: &RosterSnapshot) -> RosterDiff {
        let left = self
            .members
            .iter()
            .filter(|(id, _)| !newer.members.contains_key(*id))
            .map(|(id, name)| Member::new(id.clone(), name.clone()))
            .collect();

        let joined = newer
            .members
            .iter()
            .filter(|(id, _)| !self.members.contains_key(*id))
            .map(|(id, name)| Member::new(id.clone(), name.clone()))
            .collect();

        RosterDiff { left, joined }
    }
}

/// Members who left and joined between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDiff {
    /// Members present before and absent now.
    pub left: Vec<Member>,
    /// Members absent before and present now.
    pub joined: Vec<Member>,
}

impl RosterDiff {
    /// Returns true if membership did not change.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.joined.is_empty()
    }

    /// Total number of membership changes.
    pub fn len(&self) -> usize {
        self.left.len() + self.joined.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn snapshot(entries: &[(&str, &str)]) -> RosterSnapshot {
        RosterSnapshot::from_members(entries.iter().map(|(id, name)| Member::new(*id, *name)))
    }

    fn ids(members: &[Member]) -> HashSet<&str> {
        members.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_diff_reports_left_and_joined() {
        let old = snapshot(&[("u1", "Alice"), ("u2", "Bob")]);
        let new = snapshot(&[("u1", "Alice"), ("u3", "Carol")]);

        let diff = old.diff(&new);

        assert_eq!(diff.left, vec![Member::new("u2", "Bob")]);
        assert_eq!(diff.joined, vec![Member::new("u3", "Carol")]);
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn test_diff_covers_symmetric_difference() {
        let old = snapshot(&[("a", "A"), ("b", "B"), ("c", "C"), ("d", "D")]);
        let new = snapshot(&[("c", "C"), ("d", "D"), ("e", "E"), ("f", "F"), ("g", "G")]);

        let diff = old.diff(&new);
        let left = ids(&diff.left);
        let joined = ids(&diff.joined);

        assert_eq!(left, HashSet::from(["a", "b"]));
        assert_eq!(joined, HashSet::from(["e", "f", "g"]));
        assert!(left.is_disjoint(&joined));
    }

    #[test]
    fn test_diff_uses_old_name_for_leavers_and_new_name_for_joiners() {
        let old = snapshot(&[("u1", "Old Name")]);
        let new = snapshot(&[("u2", "Fresh")]);

        let diff = old.diff(&new);

        assert_eq!(diff.left[0].display_name, "Old Name");
        assert_eq!(diff.joined[0].display_name, "Fresh");
    }

    #[test]
    fn test_rename_is_not_a_membership_change() {
        let old = snapshot(&[("u1", "Alice")]);
        let new = snapshot(&[("u1", "Alice (away)")]);

        assert!(old.diff(&new).is_empty());
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let snap = snapshot(&[("u1", "first"), ("u1", "second")]);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.name_of(&MemberId::from("u1")), Some("second"));
    }

    #[test]
    fn test_resolve_name_fallbacks() {
        let id = MemberId::from("wxid_1");
        assert_eq!(Member::resolve_name(&id, Some("Group Nick"), Some("Nick")), "Group Nick");
        assert_eq!(Member::resolve_name(&id, Some(""), Some("Nick")), "Nick");
        assert_eq!(Member::resolve_name(&id, None, None), "wxid_1");
    }
}
