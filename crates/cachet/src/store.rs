use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use {
    serde::{Deserialize, Serialize},
    tracing::{info, warn},
};

use crate::error::Result;

/// Subscribing to this service name means "every outage".
pub const ANY_SERVICE: &str = "any";

/// Alert settings for one channel (or private-chat nick).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel: String,
    #[serde(default)]
    pub services: Vec<String>,
    /// Minutes between repeated notifications of the same outage.
    #[serde(rename = "repeatGap", default)]
    pub repeat_gap: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Subscribe {
    Added,
    AlreadySubscribed,
}

/// Channel subscriptions, persisted as a JSON array.
pub struct SubscriptionStore {
    path: Option<PathBuf>,
    default_repeat_gap: u64,
    channels: Mutex<Vec<ChannelConfig>>,
}

impl SubscriptionStore {
    /// In-memory store, nothing is persisted.
    pub fn in_memory(default_repeat_gap: u64, channels: Vec<ChannelConfig>) -> Self {
        Self {
            path: None,
            default_repeat_gap,
            channels: Mutex::new(channels),
        }
    }

    /// Empty store that still saves to `path`.
    pub fn empty_at(path: &Path, default_repeat_gap: u64) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            default_repeat_gap,
            channels: Mutex::new(Vec::new()),
        }
    }

    /// Load from `path`. A missing file is an empty store.
    pub fn load(path: &Path, default_repeat_gap: u64) -> Result<Self> {
        let channels: Vec<ChannelConfig> = if path.exists() {
            botplugs_config::load_json_file(path)?
        } else {
            info!(path = %path.display(), "no cachet alert config yet, starting empty");
            Vec::new()
        };
        info!(path = %path.display(), channels = channels.len(), "loaded cachet alert config");
        Ok(Self {
            path: Some(path.to_path_buf()),
            default_repeat_gap,
            channels: Mutex::new(channels),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChannelConfig>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, channels: &[ChannelConfig]) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = botplugs_config::save_json_file(path, channels) {
            warn!(path = %path.display(), error = %e, "failed to save cachet alert config");
        }
    }

    pub fn snapshot(&self) -> Vec<ChannelConfig> {
        self.lock().clone()
    }

    pub fn get(&self, channel: &str) -> Option<ChannelConfig> {
        self.lock().iter().find(|c| c.channel == channel).cloned()
    }

    /// Channels to alert about `service`: `any` subscribers first, then
    /// subscribers of the service itself. Each channel appears once.
    pub fn channels_for(&self, service: &str) -> Vec<String> {
        let channels = self.lock();
        let mut out: Vec<String> = Vec::new();
        for wanted in [ANY_SERVICE, service] {
            for config in channels.iter() {
                if config.services.iter().any(|s| s == wanted) && !out.contains(&config.channel) {
                    out.push(config.channel.clone());
                }
            }
        }
        out
    }

    pub fn repeat_gap(&self, channel: &str) -> u64 {
        self.get(channel)
            .map_or(self.default_repeat_gap, |c| c.repeat_gap)
    }

    pub fn subscribe(&self, channel: &str, service: &str) -> Subscribe {
        let mut channels = self.lock();
        match channels.iter_mut().find(|c| c.channel == channel) {
            Some(config) if config.services.iter().any(|s| s == service) => {
                return Subscribe::AlreadySubscribed;
            },
            Some(config) => config.services.push(service.to_string()),
            None => channels.push(ChannelConfig {
                channel: channel.to_string(),
                services: vec![service.to_string()],
                repeat_gap: self.default_repeat_gap,
            }),
        }
        self.save(&channels);
        Subscribe::Added
    }

    /// Returns false when the channel has no config at all.
    pub fn unsubscribe(&self, channel: &str, service: &str) -> bool {
        let mut channels = self.lock();
        let Some(config) = channels.iter_mut().find(|c| c.channel == channel) else {
            return false;
        };
        config.services.retain(|s| s != service);
        self.save(&channels);
        true
    }

    pub fn set_repeat_gap(&self, channel: &str, minutes: u64) {
        let mut channels = self.lock();
        match channels.iter_mut().find(|c| c.channel == channel) {
            Some(config) => config.repeat_gap = minutes,
            None => channels.push(ChannelConfig {
                channel: channel.to_string(),
                services: Vec::new(),
                repeat_gap: minutes,
            }),
        }
        self.save(&channels);
    }
}
