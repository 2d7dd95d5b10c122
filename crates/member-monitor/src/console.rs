//! Console host: feeds stdin lines into a plugin as chat messages.

use monitor_models::GroupId;
use monitor_plugin::{EventAction, MessageContext, Plugin};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Attributes every line to one chat and dispatches it.
pub struct Console<'a> {
    plugin: &'a dyn Plugin,
    group: Option<GroupId>,
    sender: Option<String>,
}

impl<'a> Console<'a> {
    pub fn new(plugin: &'a dyn Plugin, group: Option<GroupId>, sender: Option<String>) -> Self {
        Self {
            plugin,
            group,
            sender,
        }
    }

    /// Dispatches one line. Returns the reply if the plugin handled it.
    pub async fn dispatch(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let mut ctx = MessageContext::text(line);
        ctx.group = self.group.clone();
        ctx.sender = self.sender.clone();

        match self.plugin.on_message(&mut ctx).await {
            EventAction::Handled => ctx.reply,
            EventAction::Continue => {
                debug!(plugin = self.plugin.name(), "message passed through");
                None
            }
        }
    }

    /// Reads lines until EOF or Ctrl-C.
    pub async fn run<R>(&self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("end of input");
                        break;
                    };
                    match self.dispatch(&line).await {
                        Some(reply) => println!("{}", reply),
                        None if !line.trim().is_empty() => println!("(passed through)"),
                        None => {}
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
        }

        Ok(())
    }
}
