//! Member monitor console host.
//!
//! Start it with:
//! ```bash
//! GEWECHAT_BASE_URL=http://127.0.0.1:2531/v2/api GEWECHAT_TOKEN=xxx GEWECHAT_APP_ID=wx_xxx \
//!     cargo run -p member-monitor -- --group 34757816141@chatroom
//! ```
//!
//! Each stdin line is delivered to the plugin as a text message from the
//! given group, so commands such as `show status` can be typed directly.

mod console;
mod paths;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use monitor_gewechat::GewechatClient;
use monitor_models::GroupId;
use monitor_persistence::ConfigStore;
use monitor_plugin::{MemberMonitor, Plugin};
use monitor_runtime::{MonitorEvent, RuntimeConfig};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::console::Console;

/// Member monitor - announce group joins and departures
#[derive(Parser, Debug)]
#[command(name = "member-monitor")]
#[command(about = "Watch group rosters through a gewechat gateway and announce membership changes")]
struct Args {
    /// Config file (default: <state dir>/member_monitor.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Group that stdin lines are attributed to
    #[arg(short, long)]
    group: Option<String>,

    /// Sender ID attached to stdin lines
    #[arg(long)]
    sender: Option<String>,

    /// gewechat gateway base URL
    #[arg(long, env = "GEWECHAT_BASE_URL")]
    base_url: String,

    /// gewechat gateway token
    #[arg(long, env = "GEWECHAT_TOKEN", hide_env_values = true)]
    token: String,

    /// gewechat app ID
    #[arg(long, env = "GEWECHAT_APP_ID")]
    app_id: String,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may come from .env files, so load them before parsing.
    let env_path = paths::env_file();
    if env_path.exists() {
        let _ = dotenvy::from_path(&env_path);
    }
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = match args.verbose {
        0 => "member_monitor=info,monitor_runtime=info,monitor_plugin=info,monitor_gewechat=warn",
        1 => "member_monitor=debug,monitor_runtime=debug,monitor_plugin=debug,monitor_gewechat=debug",
        2 => "member_monitor=trace,monitor_runtime=trace,monitor_plugin=trace,monitor_gewechat=trace",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = args.config.unwrap_or_else(paths::config_file);
    tracing::info!(path = %config_path.display(), "using config file");

    let client = Arc::new(GewechatClient::new(&args.base_url, &args.token, &args.app_id)?);
    let plugin =
        MemberMonitor::load(ConfigStore::new(config_path), client, RuntimeConfig::default()).await?;

    let mut events = plugin.runtime().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                MonitorEvent::MemberJoined { group, member } => {
                    println!("[join] {} -> {}", member.display_name, group)
                }
                MonitorEvent::MemberLeft { group, member } => {
                    println!("[leave] {} <- {}", member.display_name, group)
                }
                other => tracing::debug!(event = ?other, "monitor event"),
            }
        }
    });

    println!("\nMember monitor ({})", plugin.name());
    match &args.group {
        Some(group) => println!("   Lines are sent as messages from {}", group),
        None => println!("   Lines are sent as direct messages (use --group to pick a group)"),
    }
    println!("   Type `monitor help` for commands, Ctrl+D or Ctrl+C to stop\n");

    let console = Console::new(&plugin, args.group.map(GroupId::from), args.sender);
    let result = console.run(BufReader::new(tokio::io::stdin())).await;

    plugin.on_deactivate().await;
    result?;

    Ok(())
}
