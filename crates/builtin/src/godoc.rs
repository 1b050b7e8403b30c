use {anyhow::Result, async_trait::async_trait, serde::Deserialize};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

pub const NO_PACKAGES_FOUND: &str = "No packages found.";

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<Package>,
}

#[derive(Debug, Deserialize)]
struct Package {
    path: String,
    #[serde(default)]
    synopsis: String,
}

/// `!godoc <query>`: first package matching the query.
pub struct GodocCommand {
    client: reqwest::Client,
    search_url: String,
}

impl GodocCommand {
    pub fn new(client: reqwest::Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }

    async fn search(&self, query: &str) -> Result<String> {
        let results: SearchResults = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(match results.results.first() {
            Some(pkg) => format!("{} http://godoc.org/{}", pkg.synopsis, pkg.path),
            None => NO_PACKAGES_FOUND.to_string(),
        })
    }
}

#[async_trait]
impl Command for GodocCommand {
    fn name(&self) -> &str {
        "godoc"
    }

    fn help(&self) -> &str {
        "Searches packages in godoc.org"
    }

    fn usage(&self) -> &str {
        "package name"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        if cmd.raw_args.is_empty() {
            return Ok(Reply::none());
        }
        Ok(Reply::text(self.search(&cmd.raw_args).await?))
    }
}
