use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, info, warn};

use botplugs_common::{Cmd, CmdResult, FilterCmd, PassiveCmd, User};

use crate::{
    error::Error,
    help,
    plugin::{Command, FilterCommand, PassiveCommand, PeriodicCommand},
};

/// Registry of every loaded plugin.
///
/// Commands are keyed by lowercase name. Passive commands, filters and
/// periodic commands keep registration order.
pub struct PluginRegistry {
    prefix: String,
    commands: BTreeMap<String, Arc<dyn Command>>,
    passive: Vec<Arc<dyn PassiveCommand>>,
    filters: Vec<Arc<dyn FilterCommand>>,
    periodic: Vec<Arc<dyn PeriodicCommand>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new("!")
    }
}

impl PluginRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: BTreeMap::new(),
            passive: Vec::new(),
            filters: Vec::new(),
            periodic: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn register_command(&mut self, command: Arc<dyn Command>) {
        let name = command.name().to_lowercase();
        if name == help::HELP_COMMAND {
            warn!(command = %name, "command name is reserved, not registering");
            return;
        }
        if self.commands.insert(name.clone(), command).is_some() {
            warn!(command = %name, "command registered twice, replacing earlier one");
        }
        info!(command = %name, "command registered");
    }

    pub fn register_passive(&mut self, passive: Arc<dyn PassiveCommand>) {
        info!(passive = passive.name(), "passive command registered");
        self.passive.push(passive);
    }

    pub fn register_filter(&mut self, filter: Arc<dyn FilterCommand>) {
        info!(filter = filter.name(), "filter registered");
        self.filters.push(filter);
    }

    pub fn register_periodic(&mut self, periodic: Arc<dyn PeriodicCommand>) {
        info!(
            periodic = periodic.name(),
            schedule = %periodic.schedule(),
            "periodic command registered"
        );
        self.periodic.push(periodic);
    }

    pub fn command(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(&name.to_lowercase())
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn passive_names(&self) -> Vec<&str> {
        self.passive.iter().map(|p| p.name()).collect()
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn periodic_names(&self) -> Vec<&str> {
        self.periodic.iter().map(|p| p.name()).collect()
    }

    pub fn periodic(&self) -> &[Arc<dyn PeriodicCommand>] {
        &self.periodic
    }

    pub(crate) fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.values()
    }

    /// Process one inbound message: run the matching command (if any) and
    /// every passive command, then filter the replies.
    pub async fn handle_message(&self, msg: &PassiveCmd) -> Vec<CmdResult> {
        let mut results = Vec::new();

        if let Some(cmd) = Cmd::from_passive(&self.prefix, msg) {
            results.extend(self.execute_command(&cmd).await);
        }

        for passive in &self.passive {
            match passive.on_message(msg).await {
                Ok(reply) => results.extend(reply.into_results(&msg.channel)),
                Err(e) => {
                    warn!(passive = passive.name(), channel = %msg.channel, error = %e, "passive command failed");
                },
            }
        }

        self.filter_results(results, Some(&msg.user)).await
    }

    /// Execute an explicit command without filtering its output.
    pub async fn execute_command(&self, cmd: &Cmd) -> Vec<CmdResult> {
        if cmd.command == help::HELP_COMMAND {
            return help::render(self, cmd).into_results(&cmd.channel);
        }
        let Some(command) = self.commands.get(&cmd.command) else {
            debug!(command = %cmd.command, "unknown command ignored");
            return Vec::new();
        };

        debug!(command = %cmd.command, channel = %cmd.channel, args = ?cmd.args, "executing command");
        match command.execute(cmd).await {
            Ok(reply) => reply.into_results(&cmd.channel),
            Err(e) => {
                warn!(command = %cmd.command, channel = %cmd.channel, error = %e, "command failed");
                vec![CmdResult::new(
                    cmd.channel.clone(),
                    format!("Error executing {}: {e}", cmd.command),
                )]
            },
        }
    }

    /// Run every filter over an outbound message in registration order.
    ///
    /// Returns `None` when a filter drops the message. A failing filter is
    /// skipped and the message passes on unchanged.
    pub async fn apply_filters(
        &self,
        target: &str,
        message: String,
        user: Option<&User>,
    ) -> Option<String> {
        let mut cmd = FilterCmd {
            target: target.to_string(),
            message,
            user: user.cloned(),
        };
        for filter in &self.filters {
            match filter.filter(&cmd).await {
                Ok(Some(message)) if !message.is_empty() => cmd.message = message,
                Ok(_) => {
                    debug!(filter = filter.name(), channel = target, "message dropped by filter");
                    return None;
                },
                Err(e) => {
                    warn!(filter = filter.name(), channel = target, error = %e, "filter failed, passing message through");
                },
            }
        }
        Some(cmd.message)
    }

    pub async fn filter_results(&self, results: Vec<CmdResult>, user: Option<&User>) -> Vec<CmdResult> {
        let mut delivered = Vec::with_capacity(results.len());
        for result in results {
            if let Some(message) = self.apply_filters(&result.channel, result.message, user).await {
                delivered.push(CmdResult::new(result.channel, message));
            }
        }
        delivered
    }

    /// Run one periodic command now and filter its output.
    pub async fn run_periodic(&self, name: &str) -> anyhow::Result<Vec<CmdResult>> {
        let periodic = self
            .periodic
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| Error::unknown_periodic(name))?;
        let results = periodic.run().await?;
        Ok(self.filter_results(results, None).await)
    }
}
