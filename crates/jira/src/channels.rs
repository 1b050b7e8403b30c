use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use {
    serde::{Deserialize, Serialize},
    tracing::warn,
};

use crate::error::Result;

pub const DEFAULT_TEMPLATE: &str =
    "{{.Key}} ({{.Fields.Assignee.Key}}, {{.Fields.Status.Name}}): {{.Fields.Summary}} - {{.Self}}";
pub const DEFAULT_TEMPLATE_NEW: &str = "New {{.Fields.Type.Name}}: {{.Key}} \
     ({{.Fields.Assignee.Key}}, {{.Fields.Status.Name}}): {{.Fields.Summary}} - {{.Self}}";
pub const DEFAULT_TEMPLATE_RESOLVED: &str = "Resolved {{.Fields.Type.Name}}: {{.Key}} \
     ({{.Fields.Assignee.Key}}, {{.Fields.Status.Name}}): {{.Fields.Summary}} - {{.Self}}";

/// Per-channel JIRA settings as stored in the channel config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JiraChannelConfig {
    pub channel: String,
    pub thread: String,
    pub template: String,
    pub template_new: String,
    pub template_resolved: String,
    /// Projects to watch for new issues.
    pub notify_new: Vec<String>,
    /// Projects to watch for resolved issues.
    pub notify_resolved: Vec<String>,
    /// Only notify about issues in one of these components.
    pub components: Vec<String>,
}

impl JiraChannelConfig {
    fn with_defaults(mut self) -> Self {
        for (template, default) in [
            (&mut self.template, DEFAULT_TEMPLATE),
            (&mut self.template_new, DEFAULT_TEMPLATE_NEW),
            (&mut self.template_resolved, DEFAULT_TEMPLATE_RESOLVED),
        ] {
            if template.is_empty() {
                *template = default.to_string();
            }
        }
        self
    }

    /// True when the channel has no component filter or the issue belongs
    /// to one of its components.
    pub fn wants_components(&self, issue_components: &[&str]) -> bool {
        self.components.is_empty()
            || self
                .components
                .iter()
                .any(|c| issue_components.contains(&c.as_str()))
    }
}

/// Channel configs indexed by channel and by watched project.
#[derive(Debug, Default)]
pub struct ChannelConfigs {
    by_channel: HashMap<String, JiraChannelConfig>,
    /// project key -> channels, in config order
    notify_new: BTreeMap<String, Vec<String>>,
    notify_resolved: BTreeMap<String, Vec<String>>,
}

impl ChannelConfigs {
    pub fn load(path: &Path) -> Result<Self> {
        let configs: Vec<JiraChannelConfig> = botplugs_config::load_json_file(path)?;
        Ok(Self::from_configs(configs))
    }

    pub fn from_configs(configs: Vec<JiraChannelConfig>) -> Self {
        let mut out = Self::default();
        for config in configs {
            if config.channel.is_empty() {
                warn!("JIRA channel configuration without channel found, skipping");
                continue;
            }
            let config = config.with_defaults();
            for project in &config.notify_new {
                out.notify_new
                    .entry(project.clone())
                    .or_default()
                    .push(config.channel.clone());
            }
            for project in &config.notify_resolved {
                out.notify_resolved
                    .entry(project.clone())
                    .or_default()
                    .push(config.channel.clone());
            }
            out.by_channel.insert(config.channel.clone(), config);
        }
        out
    }

    pub fn get(&self, channel: &str) -> Option<&JiraChannelConfig> {
        self.by_channel.get(channel)
    }

    pub fn template_for(&self, channel: &str) -> &str {
        self.get(channel)
            .map_or(DEFAULT_TEMPLATE, |c| c.template.as_str())
    }

    pub fn notify_new(&self) -> &BTreeMap<String, Vec<String>> {
        &self.notify_new
    }

    pub fn notify_resolved(&self) -> &BTreeMap<String, Vec<String>> {
        &self.notify_resolved
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_indexes_configs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jira.json");
        std::fs::write(
            &path,
            r##"[
                {"channel": "#bots", "notifyNew": ["BOT", "OPS"], "notifyResolved": ["BOT"],
                 "template": "{{.Key}}", "thread": "alerts"},
                {"channel": "#ops", "notifyNew": ["OPS"], "components": ["api"]},
                {"notifyNew": ["LOST"]}
            ]"##,
        )
        .unwrap();

        let configs = ChannelConfigs::load(&path).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs.notify_new()["OPS"], vec!["#bots", "#ops"]);
        assert_eq!(configs.notify_new()["BOT"], vec!["#bots"]);
        assert!(!configs.notify_new().contains_key("LOST"));
        assert_eq!(configs.notify_resolved().len(), 1);

        assert_eq!(configs.template_for("#bots"), "{{.Key}}");
        assert_eq!(configs.template_for("#ops"), DEFAULT_TEMPLATE);
        assert_eq!(configs.template_for("#elsewhere"), DEFAULT_TEMPLATE);
        let ops = configs.get("#ops").unwrap();
        assert_eq!(ops.template_new, DEFAULT_TEMPLATE_NEW);
        assert_eq!(ops.template_resolved, DEFAULT_TEMPLATE_RESOLVED);
    }

    #[test]
    fn component_filter() {
        let config = JiraChannelConfig {
            components: vec!["api".into()],
            ..JiraChannelConfig::default()
        };
        assert!(config.wants_components(&["web", "api"]));
        assert!(!config.wants_components(&["web"]));
        assert!(JiraChannelConfig::default().wants_components(&[]));
    }
}
