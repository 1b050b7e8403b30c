//! Shortens links in everything the bot says, via the bitly API.

pub mod client;
pub mod error;
pub mod filter;

use std::sync::Arc;

use tracing::info;

use {botplugs_config::BitlyConfig, botplugs_plugins::PluginRegistry};

pub use {
    client::BitlyClient,
    error::{Error, Result},
    filter::{BitlyFilter, find_urls},
};

/// Register the filter when a token is configured.
pub fn register(registry: &mut PluginRegistry, config: &BitlyConfig, http: &reqwest::Client) -> bool {
    let Some(token) = config.token.clone() else {
        info!("BITLY_TOKEN not set, bitly filter disabled");
        return false;
    };
    let client = BitlyClient::new(http.clone(), &config.api_url, token);
    registry.register_filter(Arc::new(BitlyFilter::new(client)));
    true
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use secrecy::Secret;

    use super::*;

    #[test]
    fn registers_only_with_token() {
        let mut registry = PluginRegistry::default();
        let mut config = BitlyConfig::default();
        assert!(!register(&mut registry, &config, &reqwest::Client::new()));
        assert!(registry.filter_names().is_empty());

        config.token = Some(Secret::new("tok".into()));
        assert!(register(&mut registry, &config, &reqwest::Client::new()));
        assert_eq!(registry.filter_names(), vec!["bitly"]);
    }
}
