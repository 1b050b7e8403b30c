//! Built-in `help` command.

use botplugs_common::{Cmd, Reply};

use crate::registry::PluginRegistry;

pub const HELP_COMMAND: &str = "help";

pub(crate) fn render(registry: &PluginRegistry, cmd: &Cmd) -> Reply {
    let prefix = registry.prefix();
    let Some(name) = cmd.args.first() else {
        let names: Vec<&str> = registry.commands().map(|c| c.name()).collect();
        return Reply::lines([
            format!("Type: '{prefix}help <command>' to see details about a specific command."),
            format!("Available commands: {}", names.join(", ")),
        ]);
    };

    match registry.command(name) {
        Some(command) => {
            let usage = format!("Usage: {prefix}{} {}", command.name(), command.usage());
            Reply::lines([
                format!("Description: {}", command.help()),
                usage.trim_end().to_string(),
            ])
        },
        None => Reply::text(format!("Command '{name}' not found.")),
    }
}
