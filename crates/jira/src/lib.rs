//! JIRA integration: expands issue keys mentioned in chat and posts new and
//! resolved issues of watched projects.

pub mod channels;
pub mod client;
pub mod error;
pub mod plugin;
pub mod template;

use std::sync::Arc;

use {
    secrecy::ExposeSecret,
    tracing::{info, warn},
};

use {
    botplugs_config::JiraConfig,
    botplugs_plugins::{PeriodicSchedule, PluginRegistry},
};

pub use {
    channels::{ChannelConfigs, JiraChannelConfig},
    client::{Auth, JiraClient},
    error::{Error, Result},
    plugin::{IssueNotifier, IssuePassive, Jira, NotifyKind, issue_refs},
};

fn auth(config: &JiraConfig) -> Auth {
    match &config.token {
        Some(token) if !token.expose_secret().is_empty() => Auth::Token(token.clone()),
        _ => Auth::Basic {
            user: config.user.clone().unwrap_or_default(),
            pass: config.pass.clone(),
        },
    }
}

/// Connect to JIRA and register the passive expander plus whichever
/// notifiers the channel config asks for.
///
/// Returns `Ok(false)` without registering anything when no base URL is
/// configured or the project list cannot be fetched.
pub async fn register(
    registry: &mut PluginRegistry,
    config: &JiraConfig,
    http: &reqwest::Client,
) -> Result<bool> {
    let Some(base_url) = config.base_url.as_deref().filter(|u| !u.is_empty()) else {
        info!("JIRA_BASE_URL not set, jira plugin disabled");
        return Ok(false);
    };
    let client = JiraClient::new(http.clone(), base_url, auth(config));

    let channels = match &config.channel_config {
        Some(path) => ChannelConfigs::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "error loading JIRA channel configuration (non-fatal)");
            ChannelConfigs::default()
        }),
        None => ChannelConfigs::default(),
    };

    let projects = match client.projects().await {
        Ok(projects) => projects.into_iter().map(|p| p.key).collect(),
        Err(e) => {
            warn!(error = %e, "error querying JIRA for projects, jira plugin disabled");
            return Ok(false);
        },
    };

    let notify_interval = config.notify_interval_minutes.max(1);
    let has_new = !channels.notify_new().is_empty();
    let has_resolved = !channels.notify_resolved().is_empty();
    info!(
        projects_new = channels.notify_new().len(),
        projects_resolved = channels.notify_resolved().len(),
        "JIRA notifications configured"
    );

    let jira = Arc::new(Jira {
        client,
        projects,
        channels,
        thread: config.thread,
        verbose: config.verbose,
        notify_interval,
    });

    registry.register_passive(Arc::new(IssuePassive(Arc::clone(&jira))));
    for (enabled, kind) in [(has_new, NotifyKind::New), (has_resolved, NotifyKind::Resolved)] {
        if enabled {
            let schedule = PeriodicSchedule::every_minutes(notify_interval)?;
            registry.register_periodic(Arc::new(IssueNotifier::new(Arc::clone(&jira), kind, schedule)));
        }
    }
    info!("JIRA plugin initialization successful");
    Ok(true)
}
