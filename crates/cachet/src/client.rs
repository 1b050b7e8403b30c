use {
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::error::{Error, Result};

/// Component status code for a major outage.
pub const STATUS_FAILED: u8 = 4;

#[derive(Debug, Default, Deserialize)]
struct ComponentsPage {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    data: Vec<Component>,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub status: u8,
}

pub struct CachetClient {
    http: reqwest::Client,
    api_url: String,
}

impl CachetClient {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Names of every component matching `params` (a raw query string),
    /// following pagination to the end.
    pub async fn component_names(&self, params: &str) -> Result<Vec<String>> {
        let mut url = format!("{}/v1/components?{params}", self.api_url);
        let mut names = Vec::new();
        loop {
            let page = self.fetch_page(&url).await?;
            names.extend(page.data.into_iter().map(|c| c.name));
            match page.meta.pagination.links.next_page {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }
        Ok(names)
    }

    pub async fn failed_component_names(&self) -> Result<Vec<String>> {
        self.component_names(&format!("status={STATUS_FAILED}")).await
    }

    async fn fetch_page(&self, url: &str) -> Result<ComponentsPage> {
        debug!(url, "getting components from cachet");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            warn!(url, status = status.as_u16(), "cachet API call failed");
            return Err(Error::status(status));
        }
        Ok(resp.json().await?)
    }
}
