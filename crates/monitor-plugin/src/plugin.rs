//! The member monitor plugin.

use std::sync::Arc;

use async_trait::async_trait;
use monitor_models::{GroupId, MonitorConfig, MIN_CHECK_INTERVAL_SECS};
use monitor_persistence::ConfigStore;
use monitor_runtime::{MessagingClient, MonitorError, MonitorRuntime, MonitorState, Result, RuntimeConfig};
use tracing::{debug, info, warn};

use crate::commands::{help_text, Command};
use crate::host::{ContextKind, EventAction, MessageContext, Plugin};

/// Plugin name reported to the host.
pub const PLUGIN_NAME: &str = "MemberMonitor";

const NO_GROUP: &str = "Cannot determine current group";

/// Watches group rosters and answers the monitor's text commands.
pub struct MemberMonitor {
    runtime: MonitorRuntime,
}

impl MemberMonitor {
    /// Loads the persisted config and builds the plugin.
    ///
    /// The poll loop is started right away when monitoring is enabled.
    pub async fn load(
        config_store: ConfigStore,
        client: Arc<dyn MessagingClient>,
        runtime_config: RuntimeConfig,
    ) -> Result<Self> {
        let state = Arc::new(MonitorState::load(config_store)?);
        let plugin = Self::new(MonitorRuntime::new(state, client, runtime_config));

        if plugin.runtime.state().config().await.enable_monitor {
            plugin.runtime.start().await;
        }

        info!(plugin = PLUGIN_NAME, "plugin initialized");
        Ok(plugin)
    }

    /// Wraps an existing runtime without starting it.
    pub fn new(runtime: MonitorRuntime) -> Self {
        Self { runtime }
    }

    /// The underlying runtime.
    pub fn runtime(&self) -> &MonitorRuntime {
        &self.runtime
    }

    /// Starts tracking a group the first time a message arrives from it.
    async fn auto_track(&self, group: &GroupId) {
        let state = self.runtime.state();
        if !state.config().await.auto_track_groups
            || !self.runtime.client().is_group(group)
            || state.rosters().contains(group).await
        {
            return;
        }

        match self.runtime.track_group(group).await {
            Ok(members) => info!(group = %group, members, "auto-tracked group"),
            Err(e) => warn!(group = %group, error = %e, "failed to auto-track group"),
        }
    }

    async fn handle(&self, command: Command, args: &str, group: Option<&GroupId>) -> String {
        match command {
            Command::EnableMonitor => self.set_monitor(true).await,
            Command::DisableMonitor => self.set_monitor(false).await,
            Command::EnableJoinNotice => {
                self.toggle(|c| c.enable_join_notice = true, "Join notices enabled")
                    .await
            }
            Command::DisableJoinNotice => {
                self.toggle(|c| c.enable_join_notice = false, "Join notices disabled")
                    .await
            }
            Command::EnableExitNotice => {
                self.toggle(|c| c.enable_exit_notice = true, "Exit notices enabled")
                    .await
            }
            Command::DisableExitNotice => {
                self.toggle(|c| c.enable_exit_notice = false, "Exit notices disabled")
                    .await
            }
            Command::ShowStatus => self.status().await,
            Command::RefreshMembers => self.refresh(group).await,
            Command::SetInterval => self.set_interval(args).await,
            Command::AddGroup => self.add_group(group).await,
            Command::RemoveGroup => self.remove_group(group).await,
            Command::ListGroups => self.list_groups().await,
            Command::Help => help_text(),
        }
    }

    async fn toggle(&self, f: impl FnOnce(&mut MonitorConfig), reply: &str) -> String {
        match self.runtime.state().update_config(f).await {
            Ok(()) => reply.to_string(),
            Err(e) => config_failure(&e),
        }
    }

    async fn set_monitor(&self, enabled: bool) -> String {
        if let Err(e) = self
            .runtime
            .state()
            .update_config(|c| c.enable_monitor = enabled)
            .await
        {
            return config_failure(&e);
        }

        if enabled {
            self.runtime.start().await;
            "Member monitor enabled".to_string()
        } else {
            self.runtime.stop().await;
            "Member monitor disabled".to_string()
        }
    }

    async fn status(&self) -> String {
        let config = self.runtime.state().config().await;
        let (groups, members) = self.runtime.state().rosters().totals().await;
        let running = self.runtime.is_running().await;

        format!(
            "Member monitor: {}\n\
             Poll task: {}\n\
             Join notices: {}\n\
             Exit notices: {}\n\
             Groups tracked: {}\n\
             Members recorded: {}\n\
             Check interval: {} seconds",
            on_off(config.enable_monitor),
            if running { "running" } else { "stopped" },
            on_off(config.enable_join_notice),
            on_off(config.enable_exit_notice),
            groups,
            members,
            config.check_interval,
        )
    }

    async fn refresh(&self, group: Option<&GroupId>) -> String {
        let Some(group) = group else {
            return NO_GROUP.to_string();
        };

        match self.runtime.refresh_group(group).await {
            Ok(members) => format!("Member list refreshed: {} members", members),
            Err(e) => {
                warn!(group = %group, error = %e, "refresh failed");
                "Failed to refresh member list".to_string()
            }
        }
    }

    async fn set_interval(&self, args: &str) -> String {
        if args.is_empty() {
            let current = self.runtime.state().config().await.check_interval;
            return format!(
                "Current check interval: {} seconds\nUsage: set interval <seconds>",
                current
            );
        }

        let Ok(secs) = args.parse::<i64>() else {
            return "Please enter a valid number".to_string();
        };
        if secs < MIN_CHECK_INTERVAL_SECS as i64 {
            return format!(
                "Check interval cannot be less than {} seconds",
                MIN_CHECK_INTERVAL_SECS
            );
        }

        let secs = secs.unsigned_abs();
        match self
            .runtime
            .state()
            .update_config(|c| c.check_interval = secs)
            .await
        {
            Ok(()) => {
                debug!(secs, "check interval changed");
                format!("Check interval set to {} seconds", secs)
            }
            Err(e) => config_failure(&e),
        }
    }

    async fn add_group(&self, group: Option<&GroupId>) -> String {
        let Some(group) = group else {
            return NO_GROUP.to_string();
        };
        if !self.runtime.client().is_group(group) {
            return "Current chat is not a group, cannot add".to_string();
        }
        if self.runtime.state().config().await.is_listed(group) {
            return "This group is already being monitored".to_string();
        }

        match self.runtime.track_group(group).await {
            Ok(members) => format!(
                "Added current group to monitoring list ({} members)",
                members
            ),
            Err(MonitorError::NotAGroup(_)) => {
                "Current chat is not a group, cannot add".to_string()
            }
            Err(e) => {
                warn!(group = %group, error = %e, "failed to add group");
                "Failed to add current group to monitoring list".to_string()
            }
        }
    }

    /// Drops the group from the list along with its snapshot.
    ///
    /// With auto-tracking on, the next message from the group tracks it
    /// again.
    async fn remove_group(&self, group: Option<&GroupId>) -> String {
        let Some(group) = group else {
            return NO_GROUP.to_string();
        };

        match self.runtime.untrack_group(group).await {
            Ok(true) => "Removed current group from monitoring list".to_string(),
            Ok(false) => "Not currently monitoring this group".to_string(),
            Err(e) => config_failure(&e),
        }
    }

    async fn list_groups(&self) -> String {
        let groups = self.runtime.state().config().await.monitor_groups;
        if groups.is_empty() {
            return "Monitoring list is empty; every group the bot is in is monitored".to_string();
        }

        let rosters = self.runtime.state().rosters();
        let mut text = String::from("Monitored groups:");
        for (i, group) in groups.iter().enumerate() {
            let count = rosters.member_count(group).await;
            text.push_str(&format!("\n{}. {} ({} members)", i + 1, group, count));
        }
        text
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn config_failure(e: &MonitorError) -> String {
    warn!(error = %e, "failed to update monitor config");
    format!("Failed to save configuration: {}", e)
}

#[async_trait]
impl Plugin for MemberMonitor {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn on_message(&self, ctx: &mut MessageContext) -> EventAction {
        if ctx.kind != ContextKind::Text {
            return EventAction::Continue;
        }

        if let Some(group) = &ctx.group {
            self.auto_track(group).await;
        }

        let Some((command, args)) = Command::parse(&ctx.content) else {
            return EventAction::Continue;
        };

        debug!(command = command.literal(), group = ?ctx.group, "handling command");
        let reply = self.handle(command, args, ctx.group.as_ref()).await;
        ctx.reply = Some(reply);
        EventAction::Handled
    }

    fn help_text(&self) -> String {
        help_text()
    }

    async fn on_deactivate(&self) {
        self.runtime.stop().await;
        info!(plugin = PLUGIN_NAME, "plugin deactivated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_runtime::testing::MockClient;
    use tempfile::TempDir;

    struct Harness {
        dir: TempDir,
        client: Arc<MockClient>,
        plugin: MemberMonitor,
    }

    impl Harness {
        async fn send(&self, text: &str, group: Option<&str>) -> (EventAction, Option<String>) {
            let mut ctx = MessageContext::text(text);
            if let Some(group) = group {
                ctx = ctx.in_group(group);
            }
            let action = self.plugin.on_message(&mut ctx).await;
            (action, ctx.reply)
        }

        async fn reply(&self, text: &str, group: Option<&str>) -> String {
            let (action, reply) = self.send(text, group).await;
            assert_eq!(action, EventAction::Handled);
            reply.unwrap()
        }

        async fn config(&self) -> MonitorConfig {
            self.plugin.runtime().state().config().await
        }

        fn saved(&self) -> MonitorConfig {
            ConfigStore::in_dir(self.dir.path()).load().unwrap().unwrap()
        }
    }

    /// Monitoring off so the poll loop stays out of the way.
    fn quiet_config() -> MonitorConfig {
        MonitorConfig {
            enable_monitor: false,
            ..MonitorConfig::default()
        }
    }

    async fn harness(config: MonitorConfig) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());
        store.save(&config).unwrap();
        let client = Arc::new(MockClient::new());
        let plugin = MemberMonitor::load(store, client.clone(), RuntimeConfig::default())
            .await
            .unwrap();
        Harness {
            dir,
            client,
            plugin,
        }
    }

    #[tokio::test]
    async fn test_load_writes_defaults_and_starts_loop() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path());

        let plugin = MemberMonitor::load(store, Arc::new(MockClient::new()), RuntimeConfig::default())
            .await
            .unwrap();

        assert!(plugin.runtime().is_running().await);
        assert!(ConfigStore::in_dir(dir.path()).load().unwrap().is_some());
        plugin.on_deactivate().await;
        assert!(!plugin.runtime().is_running().await);
    }

    #[tokio::test]
    async fn test_unrecognized_text_passes_through() {
        let h = harness(quiet_config()).await;

        let (action, reply) = h.send("good morning", None).await;

        assert_eq!(action, EventAction::Continue);
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_non_text_message_is_ignored() {
        let h = harness(quiet_config()).await;
        let mut ctx = MessageContext::text("show status").with_kind(ContextKind::Image);

        assert_eq!(h.plugin.on_message(&mut ctx).await, EventAction::Continue);
        assert!(ctx.reply.is_none());
    }

    #[tokio::test]
    async fn test_enable_and_disable_monitor() {
        let h = harness(quiet_config()).await;
        assert!(!h.plugin.runtime().is_running().await);

        assert_eq!(h.reply("enable monitor", None).await, "Member monitor enabled");
        assert!(h.plugin.runtime().is_running().await);
        assert!(h.saved().enable_monitor);

        assert_eq!(h.reply("disable monitor", None).await, "Member monitor disabled");
        assert!(!h.plugin.runtime().is_running().await);
        assert!(!h.saved().enable_monitor);
    }

    #[tokio::test]
    async fn test_notice_toggles_persist() {
        let h = harness(quiet_config()).await;

        assert_eq!(h.reply("disable join notice", None).await, "Join notices disabled");
        assert_eq!(h.reply("disable exit notice", None).await, "Exit notices disabled");
        assert!(!h.saved().enable_join_notice);
        assert!(!h.saved().enable_exit_notice);

        assert_eq!(h.reply("enable exit notice", None).await, "Exit notices enabled");
        assert_eq!(h.reply("enable join notice", None).await, "Join notices enabled");
        assert!(h.config().await.enable_join_notice);
        assert!(h.saved().enable_exit_notice);
    }

    #[tokio::test]
    async fn test_set_interval() {
        let h = harness(quiet_config()).await;

        assert_eq!(
            h.reply("set interval 3", None).await,
            "Check interval cannot be less than 5 seconds"
        );
        assert_eq!(h.config().await.check_interval, 60);

        assert_eq!(
            h.reply("set interval -10", None).await,
            "Check interval cannot be less than 5 seconds"
        );
        assert_eq!(
            h.reply("set interval soon", None).await,
            "Please enter a valid number"
        );

        assert_eq!(
            h.reply("set interval 30", None).await,
            "Check interval set to 30 seconds"
        );
        assert_eq!(h.saved().check_interval, 30);

        let current = h.reply("set interval", None).await;
        assert!(current.starts_with("Current check interval: 30 seconds"));
    }

    #[tokio::test]
    async fn test_add_group() {
        let h = harness(quiet_config()).await;
        h.client.set_roster(&"g@chatroom".into(), [("u1", "Alice"), ("u2", "Bob")]);

        assert_eq!(h.reply("add monitored group", None).await, NO_GROUP);

        // Auto-tracking would add the group before the command runs.
        h.plugin
            .runtime()
            .state()
            .update_config(|c| c.auto_track_groups = false)
            .await
            .unwrap();

        assert_eq!(
            h.reply("add monitored group", Some("g@chatroom")).await,
            "Added current group to monitoring list (2 members)"
        );
        assert_eq!(h.saved().monitor_groups, vec![GroupId::from("g@chatroom")]);
        assert!(h.client.sent().is_empty());

        assert_eq!(
            h.reply("add monitored group", Some("g@chatroom")).await,
            "This group is already being monitored"
        );
    }

    #[tokio::test]
    async fn test_add_group_rejects_direct_chat_and_failures() {
        let h = harness(quiet_config()).await;
        h.client.mark_not_group(&"wxid_friend".into());

        assert_eq!(
            h.reply("add monitored group", Some("wxid_friend")).await,
            "Current chat is not a group, cannot add"
        );

        // Unknown to the mock, so the fetch fails.
        assert_eq!(
            h.reply("add monitored group", Some("gone@chatroom")).await,
            "Failed to add current group to monitoring list"
        );
        assert!(h.config().await.monitor_groups.is_empty());
    }

    #[tokio::test]
    async fn test_remove_group() {
        let h = harness(quiet_config()).await;
        let group = GroupId::from("g@chatroom");
        h.client.set_roster(&group, [("u1", "Alice")]);

        assert_eq!(
            h.reply("remove monitored group", Some("other@chatroom")).await,
            "Not currently monitoring this group"
        );

        h.reply("show status", Some("g@chatroom")).await;
        assert!(h.config().await.is_listed(&group));

        assert_eq!(
            h.reply("remove monitored group", Some("g@chatroom")).await,
            "Removed current group from monitoring list"
        );
        assert!(h.saved().monitor_groups.is_empty());
        assert!(!h.plugin.runtime().state().rosters().contains(&group).await);
    }

    #[tokio::test]
    async fn test_removed_group_is_tracked_again_on_next_message() {
        let h = harness(quiet_config()).await;
        let group = GroupId::from("g@chatroom");
        h.client.set_roster(&group, [("u1", "Alice")]);

        h.send("hello", Some("g@chatroom")).await;
        h.reply("remove monitored group", Some("g@chatroom")).await;
        assert!(!h.config().await.is_listed(&group));

        h.send("still here", Some("g@chatroom")).await;

        assert!(h.config().await.is_listed(&group));
        assert!(h.plugin.runtime().state().rosters().contains(&group).await);
        assert_eq!(h.client.fetch_count(&group), 2);
    }

    #[tokio::test]
    async fn test_list_groups() {
        let h = harness(quiet_config()).await;

        assert_eq!(
            h.reply("list monitored groups", None).await,
            "Monitoring list is empty; every group the bot is in is monitored"
        );

        h.client.set_roster(&"a@chatroom".into(), [("u1", "Alice"), ("u2", "Bob")]);
        h.client.set_roster(&"b@chatroom".into(), [("u3", "Carol")]);
        h.send("hello", Some("a@chatroom")).await;
        h.send("hello", Some("b@chatroom")).await;

        assert_eq!(
            h.reply("list monitored groups", None).await,
            "Monitored groups:\n1. a@chatroom (2 members)\n2. b@chatroom (1 members)"
        );
    }

    #[tokio::test]
    async fn test_refresh_members() {
        let h = harness(quiet_config()).await;
        let group = GroupId::from("g@chatroom");
        h.client.set_roster(&group, [("u1", "Alice")]);
        h.send("hi", Some("g@chatroom")).await;

        h.client.set_roster(&group, [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol")]);
        assert_eq!(
            h.reply("refresh members", Some("g@chatroom")).await,
            "Member list refreshed: 3 members"
        );
        assert!(h.client.sent().is_empty());

        assert_eq!(h.reply("refresh members", None).await, NO_GROUP);

        h.client.set_failing(&group, true);
        assert_eq!(
            h.reply("refresh members", Some("g@chatroom")).await,
            "Failed to refresh member list"
        );
        assert_eq!(h.plugin.runtime().state().rosters().member_count(&group).await, 3);
    }

    #[tokio::test]
    async fn test_status_report() {
        let h = harness(quiet_config()).await;
        h.client.set_roster(&"g@chatroom".into(), [("u1", "Alice"), ("u2", "Bob")]);
        h.send("hi", Some("g@chatroom")).await;

        let status = h.reply("show status", None).await;

        assert_eq!(
            status,
            "Member monitor: disabled\n\
             Poll task: stopped\n\
             Join notices: enabled\n\
             Exit notices: enabled\n\
             Groups tracked: 1\n\
             Members recorded: 2\n\
             Check interval: 60 seconds"
        );
    }

    #[tokio::test]
    async fn test_auto_track_on_first_message() {
        let h = harness(quiet_config()).await;
        let group = GroupId::from("g@chatroom");
        h.client.set_roster(&group, [("u1", "Alice")]);

        let (action, _) = h.send("hello all", Some("g@chatroom")).await;
        assert_eq!(action, EventAction::Continue);
        assert_eq!(h.saved().monitor_groups, vec![group.clone()]);
        assert_eq!(h.client.fetch_count(&group), 1);

        h.send("hello again", Some("g@chatroom")).await;
        assert_eq!(h.client.fetch_count(&group), 1);
    }

    #[tokio::test]
    async fn test_auto_track_can_be_disabled() {
        let h = harness(MonitorConfig {
            auto_track_groups: false,
            ..quiet_config()
        })
        .await;
        let group = GroupId::from("g@chatroom");
        h.client.set_roster(&group, [("u1", "Alice")]);

        h.send("hello all", Some("g@chatroom")).await;

        assert_eq!(h.client.fetch_count(&group), 0);
        assert!(h.config().await.monitor_groups.is_empty());
    }

    #[tokio::test]
    async fn test_help() {
        let h = harness(quiet_config()).await;

        let reply = h.reply("monitor help", None).await;

        assert_eq!(reply, h.plugin.help_text());
        assert!(reply.contains("add monitored group"));
    }
}
