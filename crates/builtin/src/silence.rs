//! `!silence <minutes>` and the filter that enforces it.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use {
    anyhow::Result,
    async_trait::async_trait,
    chrono::Utc,
    tracing::{debug, info},
};

use {
    botplugs_common::{Cmd, ExpiringMap, FilterCmd, Reply},
    botplugs_plugins::{Command, FilterCommand},
};

const USAGE_ERROR: &str = "Argument must be exactly 1 number (of minutes to be silent)";

/// Delay before a new silence takes effect, so the confirmation goes out.
const GRACE: Duration = Duration::from_secs(1);

/// Channels currently silenced.
#[derive(Default)]
pub struct SilenceState {
    until: ExpiringMap<String>,
    grace: ExpiringMap<String>,
}

impl SilenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Silence `channel` for `minutes`; zero or negative lifts it.
    pub fn silence_at(&self, channel: &str, now: Instant, minutes: i64) {
        if minutes <= 0 {
            self.until.remove(&channel.to_string());
            self.grace.remove(&channel.to_string());
            return;
        }
        let ttl = Duration::from_secs(minutes.unsigned_abs().saturating_mul(60));
        self.until.insert_at(channel.to_string(), now, ttl);
        self.grace.insert_at(channel.to_string(), now, GRACE);
    }

    pub fn is_silent_at(&self, channel: &str, now: Instant) -> bool {
        let key = channel.to_string();
        self.until.contains_at(&key, now) && !self.grace.contains_at(&key, now)
    }
}

pub struct SilenceCommand {
    state: Arc<SilenceState>,
}

impl SilenceCommand {
    pub fn new(state: Arc<SilenceState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Command for SilenceCommand {
    fn name(&self) -> &str {
        "silence"
    }

    fn help(&self) -> &str {
        "Makes the bot completely silent for X minutes (0 removes silence)"
    }

    fn usage(&self) -> &str {
        "5"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        if cmd.args.len() != 1 {
            return Ok(Reply::text(USAGE_ERROR));
        }
        let Ok(minutes) = cmd.int_arg(0) else {
            return Ok(Reply::text(format!("{USAGE_ERROR}!")));
        };

        let Some(until) = chrono::Duration::try_minutes(minutes)
            .and_then(|d| Utc::now().checked_add_signed(d))
        else {
            return Ok(Reply::text(format!("{USAGE_ERROR}!")));
        };
        self.state.silence_at(&cmd.channel, Instant::now(), minutes);
        info!(channel = %cmd.channel, minutes, "channel silenced");
        Ok(Reply::text(format!(
            "OK, I will be silent until {}",
            until.format("%a, %d %b %Y %H:%M:%S UTC")
        )))
    }
}

pub struct SilenceFilter {
    state: Arc<SilenceState>,
}

impl SilenceFilter {
    pub fn new(state: Arc<SilenceState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl FilterCommand for SilenceFilter {
    fn name(&self) -> &str {
        "silence"
    }

    async fn filter(&self, cmd: &FilterCmd) -> Result<Option<String>> {
        if self.state.is_silent_at(&cmd.target, Instant::now()) {
            debug!(channel = %cmd.target, "silencing message");
            return Ok(None);
        }
        Ok(Some(cmd.message.clone()))
    }
}
