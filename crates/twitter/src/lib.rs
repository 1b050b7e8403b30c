//! Expands tweet links posted in chat into the tweet text.

pub mod client;
pub mod error;
pub mod plugin;

use std::sync::Arc;

use tracing::warn;

use {botplugs_config::TwitterConfig, botplugs_plugins::PluginRegistry};

pub use {
    client::{Tweet, TwitterClient},
    error::{Error, Result},
    plugin::{TweetPassive, find_tweet_ids, format_tweet},
};

/// Register the passive. Without credentials it stays registered and
/// reports the missing credentials whenever a tweet link shows up.
pub fn register(registry: &mut PluginRegistry, config: &TwitterConfig, http: &reqwest::Client) {
    let client = match (&config.consumer_key, &config.consumer_secret) {
        (Some(key), Some(secret)) => {
            match TwitterClient::new(http.clone(), &config.api_url, key.clone(), secret.clone()) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "twitter client not configured");
                    None
                },
            }
        },
        _ => {
            warn!("TWITTER_CONSUMER_KEY/TWITTER_CONSUMER_SECRET not set");
            None
        },
    };
    registry.register_passive(Arc::new(TweetPassive::new(client)));
}
