//! In-memory [`MessagingClient`] for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use monitor_models::{GroupId, Member, MemberId};

use crate::client::{ClientError, MessagingClient};

#[derive(Default)]
struct Inner {
    rosters: HashMap<GroupId, Vec<Member>>,
    failing: HashSet<GroupId>,
    non_groups: HashSet<GroupId>,
    fetches: HashMap<GroupId, usize>,
    sent: Vec<(GroupId, String)>,
    fail_sends: bool,
    panic_on_fetch: bool,
    fetch_delay: Option<Duration>,
    send_delay: Option<Duration>,
}

/// Scripted messaging client that records every outbound message.
#[derive(Default)]
pub struct MockClient {
    inner: Mutex<Inner>,
}

impl MockClient {
    /// Creates an empty mock with no known groups.
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the roster returned for a group.
    pub fn set_roster<I, N>(&self, group: &GroupId, members: impl IntoIterator<Item = (I, N)>)
    where
        I: Into<MemberId>,
        N: Into<String>,
    {
        let members = members
            .into_iter()
            .map(|(id, name)| Member::new(id, name))
            .collect();
        self.set_members(group, members);
    }

    /// Sets the roster returned for a group from ready-made members.
    pub fn set_members(&self, group: &GroupId, members: Vec<Member>) {
        self.inner().rosters.insert(group.clone(), members);
    }

    /// Makes fetches for a group fail (or succeed again).
    pub fn set_failing(&self, group: &GroupId, failing: bool) {
        let mut inner = self.inner();
        if failing {
            inner.failing.insert(group.clone());
        } else {
            inner.failing.remove(group);
        }
    }

    /// Marks an ID as a direct chat rather than a group.
    pub fn mark_not_group(&self, group: &GroupId) {
        self.inner().non_groups.insert(group.clone());
    }

    /// Makes every send fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.inner().fail_sends = fail;
    }

    /// Makes every fetch panic.
    pub fn set_panic_on_fetch(&self, panic: bool) {
        self.inner().panic_on_fetch = panic;
    }

    /// Delays every fetch by the given duration.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.inner().fetch_delay = Some(delay);
    }

    /// Delays every send by the given duration.
    pub fn set_send_delay(&self, delay: Duration) {
        self.inner().send_delay = Some(delay);
    }

    /// Messages sent so far, in order.
    pub fn sent(&self) -> Vec<(GroupId, String)> {
        self.inner().sent.clone()
    }

    /// Number of fetches issued for a group.
    pub fn fetch_count(&self, group: &GroupId) -> usize {
        self.inner().fetches.get(group).copied().unwrap_or(0)
    }
}

#[async_trait]
impl MessagingClient for MockClient {
    async fn fetch_roster(&self, group: &GroupId) -> Result<Vec<Member>, ClientError> {
        let (delay, panic) = {
            let mut inner = self.inner();
            *inner.fetches.entry(group.clone()).or_default() += 1;
            (inner.fetch_delay, inner.panic_on_fetch)
        };

        if panic {
            panic!("mock fetch panic for {}", group);
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner();
        if inner.failing.contains(group) {
            return Err(ClientError::Request(format!("mock failure for {}", group)));
        }
        inner
            .rosters
            .get(group)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                ret: 500,
                message: format!("unknown group {}", group),
            })
    }

    async fn send_text(&self, group: &GroupId, text: &str) -> Result<(), ClientError> {
        let delay = self.inner().send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner();
        if inner.fail_sends {
            return Err(ClientError::Request("mock send failure".to_string()));
        }
        inner.sent.push((group.clone(), text.to_string()));
        Ok(())
    }

    fn is_group(&self, group: &GroupId) -> bool {
        !self.inner().non_groups.contains(group)
    }
}
