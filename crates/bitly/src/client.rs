use {
    reqwest::StatusCode,
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::error::{Error, Result};

#[derive(Serialize)]
struct ShortenRequest<'a> {
    long_url: &'a str,
}

#[derive(Deserialize)]
struct ShortenReply {
    #[serde(default)]
    link: String,
}

/// Thin client for the bitly v4 API.
pub struct BitlyClient {
    http: reqwest::Client,
    api_url: String,
    token: Secret<String>,
}

impl BitlyClient {
    pub fn new(http: reqwest::Client, api_url: &str, token: Secret<String>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub async fn shorten(&self, long_url: &str) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/v4/shorten", self.api_url))
            .bearer_auth(self.token.expose_secret())
            .json(&ShortenRequest { long_url })
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(Error::status(status));
        }
        let reply: ShortenReply = resp.json().await?;
        if reply.link.is_empty() {
            return Err(Error::MissingLink);
        }
        debug!(long_url, short_url = %reply.link, "url shortened");
        Ok(reply.link)
    }
}
