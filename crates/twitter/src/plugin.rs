use std::sync::LazyLock;

use {anyhow::Result, async_trait::async_trait, regex::Regex, tracing::debug};

use {
    botplugs_common::{PassiveCmd, Reply},
    botplugs_plugins::PassiveCommand,
};

use crate::{
    client::{Tweet, TwitterClient},
    error::Error,
};

#[allow(clippy::expect_used)]
static TWEET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:mobile\.)?(?:twitter|x)\.com/[^/\s]+/status/([0-9]+)")
        .expect("valid regex")
});

#[allow(clippy::expect_used)]
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// IDs of every tweet linked in `text`, in order of appearance.
pub fn find_tweet_ids(text: &str) -> Vec<u64> {
    TWEET_LINK
        .captures_iter(text)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

pub fn format_tweet(tweet: &Tweet) -> String {
    format!(
        "Tweet from @{}: {}",
        tweet.user.screen_name,
        NEWLINES.replace_all(&tweet.full_text, " ")
    )
}

/// Replies with the text of tweets linked in chat.
pub struct TweetPassive {
    client: Option<TwitterClient>,
}

impl TweetPassive {
    /// `None` keeps the passive registered but answers links with
    /// [`Error::MissingCredentials`].
    pub fn new(client: Option<TwitterClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PassiveCommand for TweetPassive {
    fn name(&self) -> &str {
        "twitter"
    }

    async fn on_message(&self, cmd: &PassiveCmd) -> Result<Reply> {
        let ids = find_tweet_ids(&cmd.raw);
        if ids.is_empty() {
            return Ok(Reply::none());
        }
        let client = self.client.as_ref().ok_or(Error::MissingCredentials)?;
        client.check_rate_limit().await?;

        let mut tweets = Vec::with_capacity(ids.len());
        for id in ids {
            debug!(id, channel = %cmd.channel, "fetching tweet");
            tweets.push(format_tweet(&client.show(id).await?));
        }
        Ok(Reply::text(tweets.join("\n")))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {botplugs_common::User, mockito::Matcher, rstest::rstest, secrecy::Secret};

    use super::*;

    #[rstest]
    #[case("https://twitter.com/golang/status/123", vec![123])]
    #[case("see http://mobile.twitter.com/a_b/status/7?s=20 now", vec![7])]
    #[case("https://x.com/rustlang/status/99", vec![99])]
    #[case(
        "https://twitter.com/a/status/1 and https://twitter.com/b/status/2",
        vec![1, 2]
    )]
    #[case("https://twitter.com/golang", vec![])]
    #[case("https://nottwitter.org/a/status/5", vec![])]
    fn extracts_tweet_ids(#[case] text: &str, #[case] want: Vec<u64>) {
        assert_eq!(find_tweet_ids(text), want);
    }

    #[test]
    fn collapses_newlines() {
        let tweet = Tweet {
            id: 1,
            full_text: "line one\r\nline two\nthree".into(),
            user: crate::client::TweetUser {
                screen_name: "gopher".into(),
            },
        };
        assert_eq!(format_tweet(&tweet), "Tweet from @gopher: line one line two three");
    }

    fn msg(text: &str) -> PassiveCmd {
        PassiveCmd::new(text, "#general", User::new("ana"))
    }

    #[tokio::test]
    async fn no_links_no_reply() {
        let passive = TweetPassive::new(None);
        let reply = passive.on_message(&msg("nothing to see")).await.unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn link_without_credentials_errors() {
        let passive = TweetPassive::new(None);
        let err = passive
            .on_message(&msg("https://twitter.com/a/status/1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing API credentials");
    }

    #[tokio::test]
    async fn replies_with_every_linked_tweet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth2/token")
            .with_body(r#"{"access_token":"AAAA"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/1.1/application/rate_limit_status.json")
            .match_query(Matcher::Any)
            .with_body(r#"{"resources":{"statuses":{"/statuses/show/:id":{"remaining":10}}}}"#)
            .create_async()
            .await;
        for (id, user, text) in [("1", "alice", "first\ntweet"), ("2", "bob", "second")] {
            server
                .mock("GET", "/1.1/statuses/show.json")
                .match_query(Matcher::AllOf(vec![
                    Matcher::UrlEncoded("id".into(), id.into()),
                    Matcher::UrlEncoded("tweet_mode".into(), "extended".into()),
                ]))
                .with_body(
                    serde_json::json!({"id": id.parse::<u64>().unwrap(), "full_text": text, "user": {"screen_name": user}})
                        .to_string(),
                )
                .create_async()
                .await;
        }

        let client =
            TwitterClient::new(reqwest::Client::new(), &server.url(), "k", Secret::new("s".into()))
                .unwrap();
        let reply = TweetPassive::new(Some(client))
            .on_message(&msg(
                "https://twitter.com/alice/status/1 vs https://x.com/bob/status/2",
            ))
            .await
            .unwrap();
        assert_eq!(reply.messages, vec![
            "Tweet from @alice: first tweet\nTweet from @bob: second"
        ]);
    }
}
