use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::BotplugsConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "botplugs.toml",
    "botplugs.yaml",
    "botplugs.yml",
    "botplugs.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<BotplugsConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse_config(&substitute_env(&raw), path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./botplugs.{toml,yaml,yml,json}`
/// 2. `<user config dir>/botplugs/botplugs.{toml,yaml,yml,json}`
///
/// Returns `BotplugsConfig::default()` if no config file is found or the
/// file cannot be parsed.
pub fn discover_and_load() -> BotplugsConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    BotplugsConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists());
    if local.is_some() {
        return local;
    }
    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/botplugs/` on Linux).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "botplugs").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<BotplugsConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}

/// Apply the plugin environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut BotplugsConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Apply overrides using a custom lookup, so tests don't have to touch the
/// process environment.
pub fn apply_env_overrides_with(
    config: &mut BotplugsConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(token) = lookup("BITLY_TOKEN") {
        config.bitly.token = Some(Secret::new(token));
    }

    if let Some(api) = lookup("CACHET_API") {
        config.cachet.api_url = Some(api);
    }
    if let Some(path) = lookup("CACHET_ALERT_CONFIG") {
        config.cachet.alert_config = Some(PathBuf::from(path));
    }

    if let Some(raw) = lookup("DEDUP_TIMEOUT").filter(|v| !v.is_empty()) {
        match raw.trim().parse::<u64>() {
            Ok(minutes) => config.dedup.timeout_minutes = minutes,
            Err(e) => {
                warn!(value = %raw, error = %e, "invalid DEDUP_TIMEOUT, falling back to default");
                config.dedup.timeout_minutes = 5;
            },
        }
    }

    if let Some(url) = lookup("JIRA_BASE_URL") {
        config.jira.base_url = Some(url);
    }
    if let Some(user) = lookup("JIRA_USER") {
        config.jira.user = Some(user);
    }
    if let Some(pass) = lookup("JIRA_PASS") {
        config.jira.pass = Some(Secret::new(pass));
    }
    if let Some(token) = lookup("JIRA_TOKEN").filter(|t| !t.is_empty()) {
        config.jira.token = Some(Secret::new(token));
    }
    if let Some(path) = lookup("JIRA_CONFIG_FILE").filter(|p| !p.is_empty()) {
        config.jira.channel_config = Some(PathBuf::from(path));
    }
    if let Some(raw) = lookup("JIRA_NOTIFY_INTERVAL").filter(|v| !v.is_empty()) {
        match raw.trim().parse::<u32>() {
            Ok(minutes) if minutes > 0 => config.jira.notify_interval_minutes = minutes,
            _ => {
                warn!(value = %raw, "invalid JIRA_NOTIFY_INTERVAL, using default");
                config.jira.notify_interval_minutes = 1;
            },
        }
    }
    if lookup("JIRA_VERBOSE").is_some() {
        config.jira.verbose = true;
    }
    if lookup("JIRA_THREAD").is_some() {
        config.jira.thread = true;
    }

    if let Some(key) = lookup("TWITTER_CONSUMER_KEY") {
        config.twitter.consumer_key = Some(key);
    }
    if let Some(secret) = lookup("TWITTER_CONSUMER_SECRET") {
        config.twitter.consumer_secret = Some(Secret::new(secret));
    }
}
