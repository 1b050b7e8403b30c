use std::collections::HashMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tokio::sync::Mutex,
    tracing::debug,
};

use crate::error::{Error, Result};

const SHOW_RESOURCE: &str = "/statuses/show/:id";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitStatus {
    #[serde(default)]
    resources: RateLimitResources,
}

#[derive(Debug, Default, Deserialize)]
struct RateLimitResources {
    #[serde(default)]
    statuses: HashMap<String, RateLimit>,
}

#[derive(Debug, Deserialize)]
struct RateLimit {
    remaining: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetUser {
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: u64,
    #[serde(default)]
    pub full_text: String,
    pub user: TweetUser,
}

/// App-only (client credentials) Twitter API client.
pub struct TwitterClient {
    http: reqwest::Client,
    api_url: String,
    consumer_key: String,
    consumer_secret: Secret<String>,
    token: Mutex<Option<Secret<String>>>,
}

impl TwitterClient {
    pub fn new(
        http: reqwest::Client,
        api_url: &str,
        consumer_key: impl Into<String>,
        consumer_secret: Secret<String>,
    ) -> Result<Self> {
        let consumer_key = consumer_key.into();
        if consumer_key.is_empty() || consumer_secret.expose_secret().is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            consumer_key,
            consumer_secret,
            token: Mutex::new(None),
        })
    }

    /// Bearer token, fetched once and cached.
    async fn bearer(&self) -> Result<Secret<String>> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }

        let resp = self
            .http
            .post(format!("{}/oauth2/token", self.api_url))
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let resp = check(resp).await?;
        let body: TokenResponse = resp.json().await?;
        let token = Secret::new(body.access_token);
        *guard = Some(token.clone());
        debug!("twitter bearer token obtained");
        Ok(token)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let token = self.bearer().await?;
        let resp = self
            .http
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(token.expose_secret())
            .query(query)
            .send()
            .await?;
        check(resp).await
    }

    /// Fails with [`Error::RateLimitExceeded`] when no `statuses/show` calls remain.
    pub async fn check_rate_limit(&self) -> Result<()> {
        let status: RateLimitStatus = self
            .get("/1.1/application/rate_limit_status.json", &[("resources", "statuses")])
            .await?
            .json()
            .await?;
        let remaining = status
            .resources
            .statuses
            .get(SHOW_RESOURCE)
            .map_or(0, |limit| limit.remaining);
        debug!(remaining, "twitter rate limit");
        if remaining == 0 {
            return Err(Error::RateLimitExceeded);
        }
        Ok(())
    }

    pub async fn show(&self, id: u64) -> Result<Tweet> {
        let id = id.to_string();
        let resp = self
            .get("/1.1/statuses/show.json", &[("id", id.as_str()), ("tweet_mode", "extended")])
            .await?;
        Ok(resp.json().await?)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::status(status, body))
}
