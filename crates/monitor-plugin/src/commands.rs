//! Text command parsing.

/// Commands understood by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    EnableMonitor,
    DisableMonitor,
    EnableJoinNotice,
    DisableJoinNotice,
    EnableExitNotice,
    DisableExitNotice,
    ShowStatus,
    RefreshMembers,
    SetInterval,
    AddGroup,
    RemoveGroup,
    ListGroups,
    Help,
}

/// Command literal, command, and help description, in help order.
const COMMANDS: &[(&str, Command, &str)] = &[
    ("enable monitor", Command::EnableMonitor, "Start member monitoring"),
    ("disable monitor", Command::DisableMonitor, "Stop member monitoring"),
    ("enable join notice", Command::EnableJoinNotice, "Turn on welcome messages"),
    ("disable join notice", Command::DisableJoinNotice, "Turn off welcome messages"),
    ("enable exit notice", Command::EnableExitNotice, "Turn on farewell messages"),
    ("disable exit notice", Command::DisableExitNotice, "Turn off farewell messages"),
    ("show status", Command::ShowStatus, "Show the state of every feature"),
    ("refresh members", Command::RefreshMembers, "Reload this group's member list"),
    ("set interval", Command::SetInterval, "Set the check interval in seconds: set interval <seconds>"),
    ("add monitored group", Command::AddGroup, "Add this group to the monitoring list"),
    ("remove monitored group", Command::RemoveGroup, "Remove this group from the monitoring list"),
    ("list monitored groups", Command::ListGroups, "Show the monitored groups"),
    ("monitor help", Command::Help, "Show this help"),
];

impl Command {
    /// Matches `text` against the command literals.
    ///
    /// Surrounding whitespace is ignored. Matching is by exact, case-sensitive
    /// prefix; the rest of the text is returned trimmed as the argument.
    pub fn parse(text: &str) -> Option<(Command, &str)> {
        let text = text.trim();
        COMMANDS.iter().find_map(|(literal, command, _)| {
            text.strip_prefix(literal)
                .map(|args| (*command, args.trim()))
        })
    }

    /// The literal that triggers this command.
    pub fn literal(self) -> &'static str {
        COMMANDS
            .iter()
            .find(|(_, command, _)| *command == self)
            .map_or("", |(literal, _, _)| literal)
    }
}

/// Help text listing every command.
pub fn help_text() -> String {
    let mut text = String::from("Member monitor commands:");
    for (i, (literal, _, description)) in COMMANDS.iter().enumerate() {
        text.push_str(&format!("\n{}. {} - {}", i + 1, literal, description));
    }
    text
}
