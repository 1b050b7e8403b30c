//! Config schema types (bot identity, plugin selection, per-plugin sections).

use std::path::PathBuf;

use {secrecy::Secret, serde::Deserialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotplugsConfig {
    pub bot: BotConfig,
    pub plugins: PluginsConfig,
    pub bitly: BitlyConfig,
    pub cachet: CachetConfig,
    pub dedup: DedupConfig,
    pub jira: JiraConfig,
    pub twitter: TwitterConfig,
    pub godoc: GodocConfig,
    pub gag: GagConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix that marks a message as a command. Defaults to `!`.
    pub prefix: String,
    /// Nick the bot uses when talking on the console.
    pub name: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".into(),
            name: "botplugs".into(),
        }
    }
}

/// Which plugins get registered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// When set, only these plugins are registered.
    pub enabled: Option<Vec<String>>,
    /// Never registered, even if listed in `enabled`.
    pub disabled: Vec<String>,
}

impl PluginsConfig {
    pub fn is_enabled(&self, name: &str) -> bool {
        if self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name)) {
            return false;
        }
        match &self.enabled {
            Some(enabled) => enabled.iter().any(|e| e.eq_ignore_ascii_case(name)),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BitlyConfig {
    /// Bitly API token (`BITLY_TOKEN`).
    pub token: Option<Secret<String>>,
    pub api_url: String,
}

impl Default for BitlyConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api-ssl.bitly.com".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CachetConfig {
    /// Cachet API root, e.g. `https://status.example.com/api` (`CACHET_API`).
    pub api_url: Option<String>,
    /// JSON file holding per-channel subscriptions (`CACHET_ALERT_CONFIG`).
    pub alert_config: Option<PathBuf>,
    /// Schedule of the outage check.
    pub check_interval: String,
    /// Repeat gap for channels that subscribe without configuring one.
    pub default_repeat_gap_minutes: u64,
}

impl Default for CachetConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            alert_config: None,
            check_interval: "@every 1m".into(),
            default_repeat_gap_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// How long an identical message to the same target is suppressed
    /// (`DEDUP_TIMEOUT`).
    pub timeout_minutes: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self { timeout_minutes: 5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub user: Option<String>,
    pub pass: Option<Secret<String>>,
    /// Personal access token; preferred over user/pass when set.
    pub token: Option<Secret<String>>,
    /// JSON file with per-channel templates and notification settings.
    pub channel_config: Option<PathBuf>,
    pub notify_interval_minutes: u32,
    pub verbose: bool,
    /// Post notifications into the channel thread configured per channel.
    pub thread: bool,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user: None,
            pass: None,
            token: None,
            channel_config: None,
            notify_interval_minutes: 1,
            verbose: false,
            thread: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<Secret<String>>,
    pub api_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            consumer_key: None,
            consumer_secret: None,
            api_url: "https://api.twitter.com".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GodocConfig {
    pub search_url: String,
}

impl Default for GodocConfig {
    fn default() -> Self {
        Self {
            search_url: "https://api.godoc.org/search".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GagConfig {
    pub random_url: String,
}

impl Default for GagConfig {
    fn default() -> Self {
        Self {
            random_url: "http://9gag.com/random".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_wins_over_enabled() {
        let plugins = PluginsConfig {
            enabled: Some(vec!["cpf".into(), "lula".into()]),
            disabled: vec!["LULA".into()],
        };
        assert!(plugins.is_enabled("cpf"));
        assert!(!plugins.is_enabled("lula"));
        assert!(!plugins.is_enabled("jira"));
    }

    #[test]
    fn everything_enabled_by_default() {
        assert!(PluginsConfig::default().is_enabled("anything"));
    }
}
