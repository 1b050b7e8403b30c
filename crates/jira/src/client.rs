use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    serde_json::Value,
    tracing::debug,
};

use crate::error::{Error, Result};

/// How requests authenticate.
pub enum Auth {
    /// Personal access token, sent as `Authorization: Bearer`.
    Token(Secret<String>),
    Basic {
        user: String,
        pass: Option<Secret<String>>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Value>,
}

/// JIRA REST v2 client. Issues are kept as raw JSON so that templates can
/// reach any field.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl JiraClient {
    pub fn new(http: reqwest::Client, base_url: &str, auth: Auth) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Web URL of an issue.
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.get(format!("{}/{path}", self.base_url));
        match &self.auth {
            Auth::Token(token) => req.bearer_auth(token.expose_secret()),
            Auth::Basic { user, pass } => {
                req.basic_auth(user, pass.as_ref().map(|p| p.expose_secret()))
            },
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::status(status, body));
        }
        Ok(resp)
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        let resp = self.send(self.get("rest/api/2/project")).await?;
        Ok(resp.json().await?)
    }

    pub async fn issue(&self, key: &str) -> Result<Value> {
        debug!(key, "fetching JIRA issue");
        let resp = self.send(self.get(&format!("rest/api/2/issue/{key}"))).await?;
        Ok(resp.json().await?)
    }

    pub async fn search(&self, jql: &str) -> Result<Vec<Value>> {
        debug!(jql, "searching JIRA");
        let req = self.get("rest/api/2/search").query(&[("jql", jql)]);
        let resp: SearchResponse = self.send(req).await?.json().await?;
        Ok(resp.issues)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    #[tokio::test]
    async fn token_auth_uses_bearer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/project")
            .match_header("authorization", "Bearer pat-123")
            .with_body(r#"[{"key":"BOT","name":"Bot"},{"key":"OPS","name":"Ops"}]"#)
            .create_async()
            .await;

        let client = JiraClient::new(
            reqwest::Client::new(),
            &format!("{}/", server.url()),
            Auth::Token(Secret::new("pat-123".into())),
        );
        let keys: Vec<_> = client
            .projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(keys, vec!["BOT", "OPS"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn basic_auth_and_search_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/search")
            // "bot:secret" in base64
            .match_header("authorization", "Basic Ym90OnNlY3JldA==")
            .match_query(Matcher::UrlEncoded(
                "jql".into(),
                "project in (BOT) AND resolved > '-1m' ORDER BY key ASC".into(),
            ))
            .with_body(r#"{"issues":[{"key":"BOT-1"}]}"#)
            .create_async()
            .await;

        let client = JiraClient::new(reqwest::Client::new(), &server.url(), Auth::Basic {
            user: "bot".into(),
            pass: Some(Secret::new("secret".into())),
        });
        let issues = client
            .search("project in (BOT) AND resolved > '-1m' ORDER BY key ASC")
            .await
            .unwrap();
        assert_eq!(issues[0]["key"], "BOT-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/issue/BOT-9")
            .with_status(404)
            .with_body("Issue does not exist")
            .create_async()
            .await;

        let client = JiraClient::new(reqwest::Client::new(), &server.url(), Auth::Basic {
            user: "bot".into(),
            pass: None,
        });
        match client.issue("BOT-9").await.unwrap_err() {
            Error::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Issue does not exist");
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
