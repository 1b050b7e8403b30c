use std::time::Duration;

use tracing::info;

use {botplugs_config::BotplugsConfig, botplugs_plugins::PluginRegistry};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("botplugs/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?)
}

/// Register every enabled plugin. Integrations without the settings they
/// need skip themselves.
pub async fn build_registry(
    config: &BotplugsConfig,
    http: &reqwest::Client,
) -> anyhow::Result<PluginRegistry> {
    let mut registry = PluginRegistry::new(config.bot.prefix.clone());
    botplugs_builtin::register_all(&mut registry, config, http);

    let plugins = &config.plugins;
    if plugins.is_enabled("bitly") {
        botplugs_bitly::register(&mut registry, &config.bitly, http);
    }
    if plugins.is_enabled("cachet") {
        botplugs_cachet::register(&mut registry, &config.cachet, http)?;
    }
    if plugins.is_enabled("jira") {
        botplugs_jira::register(&mut registry, &config.jira, http).await?;
    }
    if plugins.is_enabled("twitter") {
        botplugs_twitter::register(&mut registry, &config.twitter, http);
    }

    info!(
        commands = registry.command_names().len(),
        passive = registry.passive_names().len(),
        filters = registry.filter_names().len(),
        periodic = registry.periodic_names().len(),
        "plugins registered"
    );
    Ok(registry)
}

/// Output of the `list` subcommand.
pub fn describe(registry: &PluginRegistry) -> Vec<String> {
    let section = |label: &str, names: Vec<&str>| {
        if names.is_empty() {
            format!("{label}: (none)")
        } else {
            format!("{label}: {}", names.join(", "))
        }
    };
    vec![
        section("commands", registry.command_names()),
        section("passive", registry.passive_names()),
        section("filters", registry.filter_names()),
        section("periodic", registry.periodic_names()),
    ]
}
