//! Console adapter: stdin lines become messages in [`CONSOLE_CHANNEL`],
//! everything the bot says is printed to stdout.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::{debug, info},
};

use {
    botplugs_common::{CmdResult, PassiveCmd, User},
    botplugs_plugins::{OutboundSink, PeriodicRunner, PluginRegistry},
};

pub const CONSOLE_CHANNEL: &str = "#console";

pub fn render(result: &CmdResult) -> String {
    format!("[{}] {}", result.channel, result.message)
}

/// Prints outbound messages.
pub struct StdoutSink;

#[async_trait]
impl OutboundSink for StdoutSink {
    async fn send(&self, result: CmdResult) -> anyhow::Result<()> {
        println!("{}", render(&result));
        Ok(())
    }
}

/// The console user: `$USER`, or "console".
pub fn current_user() -> User {
    let nick = std::env::var("USER")
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "console".to_string());
    User::new(nick)
}

/// Dispatch one line of input. Blank lines produce nothing.
pub async fn handle_line(
    registry: &PluginRegistry,
    line: &str,
    channel: &str,
    user: &User,
) -> Vec<CmdResult> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    let msg = PassiveCmd::new(line, channel, user.clone());
    registry.handle_message(&msg).await
}

/// Read stdin until EOF or Ctrl-C, running periodic commands meanwhile.
pub async fn run(registry: Arc<PluginRegistry>, user: User) -> anyhow::Result<()> {
    let sink = Arc::new(StdoutSink);
    let runner = PeriodicRunner::new(Arc::clone(&registry), sink.clone());
    let started = runner.start();
    info!(periodic = started, nick = %user.nick, "console ready, type a message");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                for result in handle_line(&registry, &line, CONSOLE_CHANNEL, &user).await {
                    sink.send(result).await?;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            },
        }
    }

    runner.stop().await;
    Ok(())
}
