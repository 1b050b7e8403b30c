use std::{collections::HashMap, sync::LazyLock};

use {
    anyhow::Result,
    async_trait::async_trait,
    regex::Regex,
    tracing::{info, warn},
};

use {botplugs_common::FilterCmd, botplugs_plugins::FilterCommand};

use crate::client::BitlyClient;

#[allow(clippy::expect_used)]
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b[a-z][a-z0-9+.\-]*://[^\s<>"'`]+"#).expect("valid regex")
});

/// Links with a scheme, in order of appearance, as byte ranges.
///
/// Trailing sentence punctuation is not part of the link. A closing bracket
/// is kept when it balances an opening one inside the link.
pub fn find_urls(message: &str) -> Vec<(usize, usize)> {
    URL.find_iter(message)
        .filter_map(|m| {
            let url = trim_link(m.as_str());
            if url.ends_with("://") {
                None
            } else {
                Some((m.start(), m.start() + url.len()))
            }
        })
        .collect()
}

fn trim_link(mut url: &str) -> &str {
    while let Some(last) = url.chars().last() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => unbalanced(url, '(', ')'),
            ']' => unbalanced(url, '[', ']'),
            '}' => unbalanced(url, '{', '}'),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

fn unbalanced(url: &str, open: char, close: char) -> bool {
    url.matches(close).count() > url.matches(open).count()
}

/// Replaces every link in outbound messages with its bitly short form.
pub struct BitlyFilter {
    client: BitlyClient,
}

impl BitlyFilter {
    pub fn new(client: BitlyClient) -> Self {
        Self { client }
    }

    pub async fn shorten_all(&self, message: &str) -> String {
        let spans = find_urls(message);
        if spans.is_empty() {
            return message.to_string();
        }

        let mut short: HashMap<&str, String> = HashMap::new();
        for &(start, end) in &spans {
            let url = &message[start..end];
            if short.contains_key(url) {
                continue;
            }
            match self.client.shorten(url).await {
                Ok(link) => {
                    info!(url, short_url = %link, "shortened url");
                    short.insert(url, link);
                },
                Err(e) => {
                    warn!(url, error = %e, "failed to shorten url");
                    short.insert(url, url.to_string());
                },
            }
        }

        let mut out = String::with_capacity(message.len());
        let mut last = 0;
        for (start, end) in spans {
            out.push_str(&message[last..start]);
            let url = &message[start..end];
            out.push_str(short.get(url).map_or(url, String::as_str));
            last = end;
        }
        out.push_str(&message[last..]);
        out
    }
}

#[async_trait]
impl FilterCommand for BitlyFilter {
    fn name(&self) -> &str {
        "bitly"
    }

    async fn filter(&self, cmd: &FilterCmd) -> Result<Option<String>> {
        Ok(Some(self.shorten_all(&cmd.message).await))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        mockito::Matcher,
        secrecy::Secret,
        serde_json::json,
    };

    use super::*;

    fn urls(message: &str) -> Vec<&str> {
        find_urls(message)
            .into_iter()
            .map(|(s, e)| &message[s..e])
            .collect()
    }

    #[test]
    fn finds_only_links_with_scheme() {
        assert_eq!(
            urls("see https://example.com/a?b=1, and www.example.org or ftp://files.example.net."),
            vec!["https://example.com/a?b=1", "ftp://files.example.net"]
        );
        assert!(urls("no links here").is_empty());
        assert!(urls("broken http:// link").is_empty());
    }

    #[test]
    fn keeps_balanced_brackets() {
        assert_eq!(
            urls("(see https://en.wikipedia.org/wiki/Rust_(programming_language))."),
            vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)"]
        );
        assert_eq!(urls("(https://example.com/a)"), vec!["https://example.com/a"]);
        assert_eq!(urls("[https://example.com/x[1]]"), vec!["https://example.com/x[1]"]);
    }

    fn filter_for(server: &mockito::Server) -> BitlyFilter {
        BitlyFilter::new(BitlyClient::new(
            reqwest::Client::new(),
            &server.url(),
            Secret::new("tok".into()),
        ))
    }

    #[tokio::test]
    async fn replaces_every_occurrence() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/shorten")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(json!({"long_url": "https://example.com/long"})))
            .with_status(201)
            .with_body(r#"{"link":"https://bit.ly/abc"}"#)
            .expect(1)
            .create_async()
            .await;

        let out = filter_for(&server)
            .shorten_all("https://example.com/long and again https://example.com/long")
            .await;
        assert_eq!(out, "https://bit.ly/abc and again https://bit.ly/abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_urls_are_left_alone() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v4/shorten")
            .match_body(Matcher::PartialJson(json!({"long_url": "https://good.example"})))
            .with_status(200)
            .with_body(r#"{"link":"https://bit.ly/good"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v4/shorten")
            .match_body(Matcher::PartialJson(json!({"long_url": "https://bad.example"})))
            .with_status(403)
            .create_async()
            .await;

        let filter = filter_for(&server);
        let cmd = FilterCmd {
            target: "#ops".into(),
            message: "https://bad.example https://good.example".into(),
            user: None,
        };
        assert_eq!(
            filter.filter(&cmd).await.unwrap().as_deref(),
            Some("https://bad.example https://bit.ly/good")
        );
    }

    #[tokio::test]
    async fn messages_without_links_skip_the_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v4/shorten")
            .expect(0)
            .create_async()
            .await;
        assert_eq!(filter_for(&server).shorten_all("hello").await, "hello");
        mock.assert_async().await;
    }
}
