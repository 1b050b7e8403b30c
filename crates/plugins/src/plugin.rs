use {anyhow::Result, async_trait::async_trait};

use botplugs_common::{Cmd, CmdResult, FilterCmd, PassiveCmd, Reply};

use crate::schedule::PeriodicSchedule;

/// An explicit command, triggered by `<prefix><name> [args]`.
#[async_trait]
pub trait Command: Send + Sync {
    /// Command name as typed by users (e.g. "cpf").
    fn name(&self) -> &str;

    /// One-line description shown by `help`.
    fn help(&self) -> &str;

    /// Example arguments shown by `help <name>`.
    fn usage(&self) -> &str {
        ""
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply>;
}

/// Sees every inbound message, command or not.
#[async_trait]
pub trait PassiveCommand: Send + Sync {
    fn name(&self) -> &str;

    async fn on_message(&self, cmd: &PassiveCmd) -> Result<Reply>;
}

/// Inspects outbound messages before delivery.
#[async_trait]
pub trait FilterCommand: Send + Sync {
    fn name(&self) -> &str;

    /// Return the (possibly rewritten) message, or `None` to drop it.
    async fn filter(&self, cmd: &FilterCmd) -> Result<Option<String>>;
}

/// Runs on a schedule and emits messages to explicit channels.
#[async_trait]
pub trait PeriodicCommand: Send + Sync {
    fn name(&self) -> &str;

    fn schedule(&self) -> &PeriodicSchedule;

    async fn run(&self) -> Result<Vec<CmdResult>>;
}
