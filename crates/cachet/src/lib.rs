//! Cachet status page integration: periodic outage alerts for subscribed
//! channels and the commands to manage subscriptions.

pub mod client;
pub mod error;
pub mod plugin;
pub mod store;

use std::sync::Arc;

use tracing::{info, warn};

use {
    botplugs_config::CachetConfig,
    botplugs_plugins::{PeriodicSchedule, PluginRegistry},
};

pub use {
    client::CachetClient,
    error::{Error, Result},
    plugin::{
        Cachet, RepeatGapCommand, ServicesCommand, StatusCheck, SubscribeCommand,
        SubscriptionsCommand, UnsubscribeCommand,
    },
    store::{ChannelConfig, SubscriptionStore},
};

/// Register the cachet commands and status check. Skipped (returns `false`)
/// when no API URL is configured.
pub fn register(
    registry: &mut PluginRegistry,
    config: &CachetConfig,
    http: &reqwest::Client,
) -> Result<bool> {
    let Some(api_url) = config.api_url.as_deref().filter(|u| !u.is_empty()) else {
        info!("CACHET_API not set, cachet plugin disabled");
        return Ok(false);
    };

    let store = match &config.alert_config {
        Some(path) => SubscriptionStore::load(path, config.default_repeat_gap_minutes)
            .unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "error loading cachet alert config (non-fatal), starting empty");
                SubscriptionStore::empty_at(path, config.default_repeat_gap_minutes)
            }),
        None => {
            info!("CACHET_ALERT_CONFIG not set, subscriptions will not be persisted");
            SubscriptionStore::in_memory(config.default_repeat_gap_minutes, Vec::new())
        },
    };
    let schedule = PeriodicSchedule::parse(&config.check_interval)?;
    let cachet = Arc::new(Cachet::new(CachetClient::new(http.clone(), api_url), store));

    registry.register_periodic(Arc::new(StatusCheck::new(Arc::clone(&cachet), schedule)));
    registry.register_command(Arc::new(ServicesCommand(Arc::clone(&cachet))));
    registry.register_command(Arc::new(SubscriptionsCommand(Arc::clone(&cachet))));
    registry.register_command(Arc::new(SubscribeCommand(Arc::clone(&cachet))));
    registry.register_command(Arc::new(UnsubscribeCommand(Arc::clone(&cachet))));
    registry.register_command(Arc::new(RepeatGapCommand(cachet)));
    Ok(true)
}
