use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, LazyLock},
};

use {
    anyhow::Result,
    async_trait::async_trait,
    regex::Regex,
    serde_json::{Value, json},
    tracing::{debug, info, warn},
};

use {
    botplugs_common::{CmdResult, PassiveCmd, Reply},
    botplugs_plugins::{PassiveCommand, PeriodicCommand, PeriodicSchedule},
};

use crate::{channels::ChannelConfigs, client::JiraClient, template};

#[allow(clippy::expect_used)]
static ISSUE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)-([0-9]+)\b").expect("valid regex"));

/// `(project, issue key)` pairs referenced in `text`, in order.
pub fn issue_refs(text: &str) -> Vec<(String, String)> {
    ISSUE_REF
        .captures_iter(text)
        .map(|c| (c[1].to_string(), format!("{}-{}", &c[1], &c[2])))
        .collect()
}

/// Client plus the state loaded at startup.
pub struct Jira {
    pub client: JiraClient,
    pub projects: HashSet<String>,
    pub channels: ChannelConfigs,
    /// Post notifications into the channel's configured thread.
    pub thread: bool,
    pub verbose: bool,
    /// Lookback window of the notification queries, in minutes.
    pub notify_interval: u32,
}

impl Jira {
    /// Render `issue` with `template`, falling back to its browse URL.
    pub fn format_issue(&self, issue: &Value, template: &str) -> String {
        let key = issue.get("key").and_then(Value::as_str).unwrap_or_default();
        let browse = self.client.browse_url(key);

        let mut issue = issue.clone();
        if let Some(fields) = issue.get_mut("fields").and_then(Value::as_object_mut)
            && fields.get("assignee").is_none_or(Value::is_null)
        {
            fields.insert(
                "assignee".into(),
                json!({"key": "no assignee", "name": "no assignee"}),
            );
        }
        if let Some(obj) = issue.as_object_mut() {
            obj.insert("self".into(), Value::String(browse.clone()));
        }

        template::render(template, &issue).unwrap_or_else(|e| {
            warn!(key, error = %e, "failed formatting JIRA issue");
            browse
        })
    }

    fn thread_target(&self, channel: &str) -> String {
        match self.channels.get(channel) {
            Some(config) if self.thread && !config.thread.is_empty() => {
                format!("{channel}:{channel}/{}", config.thread)
            },
            _ => channel.to_string(),
        }
    }

    /// Query the watched projects and route each issue to its channels.
    /// `watchers` maps project key to channels.
    async fn notify(
        &self,
        kind: NotifyKind,
        watchers: &BTreeMap<String, Vec<String>>,
    ) -> crate::Result<Vec<CmdResult>> {
        if watchers.is_empty() {
            return Ok(Vec::new());
        }
        let jql = kind.jql(watchers.keys().map(String::as_str), self.notify_interval);
        if self.verbose {
            info!(jql = %jql, "{} issues query", kind.label());
        }
        let issues = self.client.search(&jql).await?;

        let mut out = Vec::new();
        for issue in &issues {
            let project = issue
                .pointer("/fields/project/key")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let Some(channels) = watchers.get(project) else {
                continue;
            };
            let components: Vec<&str> = issue
                .pointer("/fields/components")
                .and_then(Value::as_array)
                .map(|cs| cs.iter().filter_map(|c| c.get("name")?.as_str()).collect())
                .unwrap_or_default();

            for channel in channels {
                let Some(config) = self.channels.get(channel) else {
                    continue;
                };
                if !config.wants_components(&components) {
                    continue;
                }
                let template = match kind {
                    NotifyKind::New => &config.template_new,
                    NotifyKind::Resolved => &config.template_resolved,
                };
                let target = self.thread_target(channel);
                if self.verbose {
                    info!(
                        channel = %target,
                        key = issue.get("key").and_then(serde_json::Value::as_str).unwrap_or_default(),
                        "notifying about {} issue",
                        kind.label()
                    );
                }
                out.push(CmdResult::new(target, self.format_issue(issue, template)));
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    New,
    Resolved,
}

impl NotifyKind {
    fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Resolved => "resolved",
        }
    }

    pub fn jql<'a>(self, projects: impl Iterator<Item = &'a str>, interval: u32) -> String {
        let projects: Vec<&str> = projects.collect();
        let filter = match self {
            Self::New => {
                format!("AND resolution = Unresolved AND created > '-{interval}m' ORDER BY key ASC")
            },
            Self::Resolved => format!("AND resolved > '-{interval}m' ORDER BY key ASC"),
        };
        format!("project in ({}) {filter}", projects.join(","))
    }
}

/// Expands issue keys mentioned in chat.
pub struct IssuePassive(pub Arc<Jira>);

#[async_trait]
impl PassiveCommand for IssuePassive {
    fn name(&self) -> &str {
        "jira"
    }

    async fn on_message(&self, cmd: &PassiveCmd) -> Result<Reply> {
        let jira = &self.0;
        let template = jira.channels.template_for(&cmd.channel);
        let mut lines = Vec::new();
        for (project, key) in issue_refs(&cmd.raw) {
            if !jira.projects.contains(&project) {
                debug!(key = %key, "not a known JIRA project");
                continue;
            }
            let issue = match jira.client.issue(&key).await {
                Ok(issue) => issue,
                Err(e) => {
                    warn!(key = %key, error = %e, "failed getting JIRA issue");
                    continue;
                },
            };
            if jira.verbose {
                info!(channel = %cmd.channel, key = %key, "replying about JIRA issue");
            }
            lines.push(jira.format_issue(&issue, template));
        }
        Ok(Reply::lines(lines))
    }
}

/// Periodic new/resolved issue notifications.
pub struct IssueNotifier {
    jira: Arc<Jira>,
    kind: NotifyKind,
    schedule: PeriodicSchedule,
}

impl IssueNotifier {
    pub fn new(jira: Arc<Jira>, kind: NotifyKind, schedule: PeriodicSchedule) -> Self {
        Self {
            jira,
            kind,
            schedule,
        }
    }
}

#[async_trait]
impl PeriodicCommand for IssueNotifier {
    fn name(&self) -> &str {
        match self.kind {
            NotifyKind::New => "periodicJIRANotifyNew",
            NotifyKind::Resolved => "periodicJIRANotifyResolved",
        }
    }

    fn schedule(&self) -> &PeriodicSchedule {
        &self.schedule
    }

    async fn run(&self) -> Result<Vec<CmdResult>> {
        let watchers = match self.kind {
            NotifyKind::New => self.jira.channels.notify_new(),
            NotifyKind::Resolved => self.jira.channels.notify_resolved(),
        };
        Ok(self.jira.notify(self.kind, watchers).await?)
    }
}
