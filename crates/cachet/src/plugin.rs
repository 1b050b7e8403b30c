use std::{sync::Arc, time::Duration};

use {
    anyhow::Result,
    async_trait::async_trait,
    tracing::{debug, info, warn},
};

use {
    botplugs_common::{Cmd, CmdResult, ExpiringMap, Reply},
    botplugs_plugins::{Command, PeriodicCommand, PeriodicSchedule},
};

use crate::{
    client::CachetClient,
    store::{Subscribe, SubscriptionStore},
};

const EXPECT_SERVICE: &str = "Expecting 1 argument: <name of service>";

/// Services listing is flushed once a chunk's names exceed this length.
const LIST_CHUNK_LEN: usize = 80;

/// Everything the cachet commands share.
pub struct Cachet {
    pub client: CachetClient,
    pub store: SubscriptionStore,
    /// `(channel, service)` pairs already notified, until their repeat gap passes.
    notified: ExpiringMap<(String, String)>,
}

impl Cachet {
    pub fn new(client: CachetClient, store: SubscriptionStore) -> Self {
        Self {
            client,
            store,
            notified: ExpiringMap::new(),
        }
    }

    /// One status check: alert subscribed channels about failed components.
    pub async fn check(&self) -> crate::Result<Vec<CmdResult>> {
        let failed = self.client.failed_component_names().await?;
        let mut out = Vec::new();
        for service in failed {
            let channels = self.store.channels_for(&service);
            debug!(service = %service, channels = ?channels, "reporting outage");
            for channel in channels {
                let gap = Duration::from_secs(self.store.repeat_gap(&channel).saturating_mul(60));
                let key = (channel.clone(), service.clone());
                if !self.notified.insert_if_absent(key, gap) {
                    debug!(service = %service, channel = %channel, "outage already notified");
                    continue;
                }
                info!(service = %service, channel = %channel, "alerting about outage");
                out.push(CmdResult::new(
                    channel,
                    format!(
                        "Service '{service}' is in outage as per {}",
                        self.client.api_url()
                    ),
                ));
            }
        }
        self.notified.purge_expired();
        Ok(out)
    }
}

/// Chunk names into comma-joined lines.
///
/// A chunk is flushed before adding a name once the names already in it
/// total more than [`LIST_CHUNK_LEN`] bytes.
pub fn chunk_names(names: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut len = 0;
    for name in names {
        if len > LIST_CHUNK_LEN {
            lines.push(current.join(", "));
            current.clear();
            len = 0;
        }
        len += name.len();
        current.push(name);
    }
    lines.push(current.join(", "));
    lines
}

pub struct StatusCheck {
    cachet: Arc<Cachet>,
    schedule: PeriodicSchedule,
}

impl StatusCheck {
    pub fn new(cachet: Arc<Cachet>, schedule: PeriodicSchedule) -> Self {
        Self { cachet, schedule }
    }
}

#[async_trait]
impl PeriodicCommand for StatusCheck {
    fn name(&self) -> &str {
        "systemStatusCheck"
    }

    fn schedule(&self) -> &PeriodicSchedule {
        &self.schedule
    }

    async fn run(&self) -> Result<Vec<CmdResult>> {
        Ok(self.cachet.check().await?)
    }
}

pub struct ServicesCommand(pub Arc<Cachet>);

#[async_trait]
impl Command for ServicesCommand {
    fn name(&self) -> &str {
        "services"
    }

    fn help(&self) -> &str {
        "List services available for subscriptions"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let channel = cmd.channel_key();
        debug!(channel, "listing cachet services");
        let reply = match self.0.client.component_names("").await {
            Ok(names) => {
                let mut lines = vec!["Services known in cachet:".to_string()];
                lines.extend(chunk_names(&names));
                Reply::lines(lines)
            },
            Err(e) => {
                warn!(error = %e, "failed getting components from cachet");
                Reply::text(format!("Failed getting components from cachet: {e}"))
            },
        };
        Ok(reply.to(channel))
    }
}

pub struct SubscriptionsCommand(pub Arc<Cachet>);

#[async_trait]
impl Command for SubscriptionsCommand {
    fn name(&self) -> &str {
        "subscriptions"
    }

    fn help(&self) -> &str {
        "Lists active outage subscriptions"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let text = match self.0.store.get(cmd.channel_key()) {
            Some(config) if !config.services.is_empty() => format!(
                "This channel is subscribed to notifications for: {}",
                config.services.join(", ")
            ),
            _ => "This channel has no subscriptions".to_string(),
        };
        Ok(Reply::text(text))
    }
}

pub struct SubscribeCommand(pub Arc<Cachet>);

#[async_trait]
impl Command for SubscribeCommand {
    fn name(&self) -> &str {
        "subscribe"
    }

    fn help(&self) -> &str {
        "Subscribes this channel to outage notifications of specific service (or 'any' for all outages)"
    }

    fn usage(&self) -> &str {
        "<service>"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let [service] = cmd.args.as_slice() else {
            return Ok(Reply::text(EXPECT_SERVICE));
        };
        let channel = cmd.channel_key();
        let text = match self.0.store.subscribe(channel, service) {
            Subscribe::Added => {
                info!(channel, service = %service, "channel subscribed");
                format!(
                    "Succesfully subscribed channel {channel} to outage notifications for '{service}'"
                )
            },
            Subscribe::AlreadySubscribed => {
                format!("This channel is already subscribed to '{service}' outage notifications")
            },
        };
        Ok(Reply::text(text))
    }
}

pub struct UnsubscribeCommand(pub Arc<Cachet>);

#[async_trait]
impl Command for UnsubscribeCommand {
    fn name(&self) -> &str {
        "unsubscribe"
    }

    fn help(&self) -> &str {
        "Unsubscribes this channel from outage notifications of specific service"
    }

    fn usage(&self) -> &str {
        "<service>"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let [service] = cmd.args.as_slice() else {
            return Ok(Reply::text(EXPECT_SERVICE));
        };
        let channel = cmd.channel_key();
        if !self.0.store.unsubscribe(channel, service) {
            return Ok(Reply::text("Channel is not subscribed to anything"));
        }
        info!(channel, service = %service, "channel unsubscribed");
        Ok(Reply::text(format!(
            "Succesfully unsubscribed channel {channel} from outage notifications for {service}"
        )))
    }
}

/// One year.
pub const MAX_REPEAT_GAP_MINUTES: u64 = 365 * 24 * 60;

pub struct RepeatGapCommand(pub Arc<Cachet>);

#[async_trait]
impl Command for RepeatGapCommand {
    fn name(&self) -> &str {
        "repeatgap"
    }

    fn help(&self) -> &str {
        "Sets number of minutes between notification of specific service outage"
    }

    fn usage(&self) -> &str {
        "60"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let [minutes] = cmd.args.as_slice() else {
            return Ok(Reply::text("Expecting 1 argument: <number of minutes>"));
        };
        let Some(minutes) = minutes
            .parse::<u64>()
            .ok()
            .filter(|m| *m <= MAX_REPEAT_GAP_MINUTES)
        else {
            return Ok(Reply::text(
                "Argument must be exactly 1 number (of minutes between notifications)",
            ));
        };
        self.0.store.set_repeat_gap(cmd.channel_key(), minutes);
        Ok(Reply::text(format!(
            "Succesfully configured notification gap to be {minutes} minutes"
        )))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {botplugs_common::User, mockito::Matcher};

    use {super::*, crate::store::ChannelConfig};

    fn cachet(url: &str, channels: Vec<ChannelConfig>) -> Arc<Cachet> {
        Arc::new(Cachet::new(
            CachetClient::new(reqwest::Client::new(), url),
            SubscriptionStore::in_memory(5, channels),
        ))
    }

    fn cmd(text: &str, channel: &str) -> Cmd {
        Cmd::from_text("!", text, channel, User::new("alice")).unwrap()
    }

    #[test]
    fn chunks_long_listings() {
        let names: Vec<String> = (0..12).map(|i| format!("service-number-{i:02}")).collect();
        let lines = chunk_names(&names);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("service-number-00, service-number-01"));
        assert_eq!(lines.concat().matches("service-number-").count(), 12);
        assert_eq!(chunk_names(&["a".into(), "b".into()]), vec!["a, b"]);
    }

    #[tokio::test]
    async fn alerts_once_per_repeat_gap() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/components")
            .match_query(Matcher::UrlEncoded("status".into(), "4".into()))
            .with_body(r#"{"data":[{"id":1,"name":"api","status":4}]}"#)
            .expect(2)
            .create_async()
            .await;

        let cachet = cachet(&server.url(), vec![
            ChannelConfig {
                channel: "#ops".into(),
                services: vec!["any".into()],
                repeat_gap: 60,
            },
            ChannelConfig {
                channel: "#api".into(),
                services: vec!["api".into()],
                repeat_gap: 60,
            },
            ChannelConfig {
                channel: "#db".into(),
                services: vec!["db".into()],
                repeat_gap: 60,
            },
        ]);

        let first = cachet.check().await.unwrap();
        let expected = format!("Service 'api' is in outage as per {}", server.url());
        assert_eq!(first, vec![
            CmdResult::new("#ops", expected.clone()),
            CmdResult::new("#api", expected),
        ]);
        assert!(cachet.check().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn subscription_commands_round_trip() {
        let cachet = cachet("http://127.0.0.1:1", Vec::new());

        let reply = SubscriptionsCommand(Arc::clone(&cachet))
            .execute(&cmd("!subscriptions", "#ops"))
            .await
            .unwrap();
        assert_eq!(reply.messages, vec!["This channel has no subscriptions"]);

        let subscribe = SubscribeCommand(Arc::clone(&cachet));
        let reply = subscribe.execute(&cmd("!subscribe api", "#ops")).await.unwrap();
        assert_eq!(reply.messages, vec![
            "Succesfully subscribed channel #ops to outage notifications for 'api'"
        ]);
        let reply = subscribe.execute(&cmd("!subscribe api", "#ops")).await.unwrap();
        assert_eq!(reply.messages, vec![
            "This channel is already subscribed to 'api' outage notifications"
        ]);
        subscribe.execute(&cmd("!subscribe db", "#ops")).await.unwrap();

        let reply = SubscriptionsCommand(Arc::clone(&cachet))
            .execute(&cmd("!subscriptions", "#ops"))
            .await
            .unwrap();
        assert_eq!(reply.messages, vec![
            "This channel is subscribed to notifications for: api, db"
        ]);

        let unsubscribe = UnsubscribeCommand(Arc::clone(&cachet));
        let reply = unsubscribe.execute(&cmd("!unsubscribe api", "#ops")).await.unwrap();
        assert_eq!(reply.messages, vec![
            "Succesfully unsubscribed channel #ops from outage notifications for api"
        ]);
        let reply = unsubscribe.execute(&cmd("!unsubscribe api", "#dev")).await.unwrap();
        assert_eq!(reply.messages, vec!["Channel is not subscribed to anything"]);
        let reply = unsubscribe.execute(&cmd("!unsubscribe", "#dev")).await.unwrap();
        assert_eq!(reply.messages, vec![EXPECT_SERVICE]);
    }

    #[tokio::test]
    async fn repeatgap_uses_private_nick() {
        let cachet = cachet("http://127.0.0.1:1", Vec::new());
        let command = RepeatGapCommand(Arc::clone(&cachet));

        let mut private = cmd("!repeatgap 15", "alice");
        private.channel_data.is_private = true;
        private.channel = "dm-1234".into();
        let reply = command.execute(&private).await.unwrap();
        assert_eq!(reply.messages, vec![
            "Succesfully configured notification gap to be 15 minutes"
        ]);
        assert_eq!(cachet.store.repeat_gap("alice"), 15);

        let reply = command.execute(&cmd("!repeatgap soon", "#ops")).await.unwrap();
        assert_eq!(reply.messages, vec![
            "Argument must be exactly 1 number (of minutes between notifications)"
        ]);
    }

    #[tokio::test]
    async fn oversized_repeat_gap_keeps_status_check_alive() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/components")
            .match_query(Matcher::UrlEncoded("status".into(), "4".into()))
            .with_body(r#"{"data":[{"id":1,"name":"api","status":4}]}"#)
            .expect(2)
            .create_async()
            .await;

        let cachet = cachet(&server.url(), vec![ChannelConfig {
            channel: "#ops".into(),
            services: vec!["any".into()],
            repeat_gap: 5,
        }]);
        let reply = RepeatGapCommand(Arc::clone(&cachet))
            .execute(&cmd("!repeatgap 18446744073709551615", "#ops"))
            .await
            .unwrap();
        assert_eq!(reply.messages, vec![
            "Argument must be exactly 1 number (of minutes between notifications)"
        ]);
        assert_eq!(cachet.store.repeat_gap("#ops"), 5);

        // a gap loaded from disk is not bounded by the command
        cachet.store.set_repeat_gap("#ops", u64::MAX);
        assert_eq!(cachet.check().await.unwrap().len(), 1);
        assert!(cachet.check().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn services_lists_to_channel_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/components")
            .match_query(Matcher::Any)
            .with_body(r#"{"data":[{"name":"api"},{"name":"web"}]}"#)
            .create_async()
            .await;
        let cachet = cachet(&server.url(), Vec::new());
        let reply = ServicesCommand(cachet)
            .execute(&cmd("!services", "#ops"))
            .await
            .unwrap();
        assert_eq!(reply.channel.as_deref(), Some("#ops"));
        assert_eq!(reply.messages, vec!["Services known in cachet:", "api, web"]);
    }

    #[tokio::test]
    async fn services_reports_api_failure() {
        let cachet = cachet("http://127.0.0.1:1", Vec::new());
        let reply = ServicesCommand(cachet)
            .execute(&cmd("!services", "#ops"))
            .await
            .unwrap();
        assert!(reply.messages[0].starts_with("Failed getting components from cachet: "));
    }
}
