use {anyhow::Result, async_trait::async_trait, tracing::debug};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

/// `!9gag`: follows the random-page redirect and replies with where it lands.
pub struct GagCommand {
    client: reqwest::Client,
    random_url: String,
}

impl GagCommand {
    pub fn new(client: reqwest::Client, random_url: impl Into<String>) -> Self {
        Self {
            client,
            random_url: random_url.into(),
        }
    }
}

#[async_trait]
impl Command for GagCommand {
    fn name(&self) -> &str {
        "9gag"
    }

    fn help(&self) -> &str {
        "Returns a random 9gag page."
    }

    async fn execute(&self, _cmd: &Cmd) -> Result<Reply> {
        let resp = self.client.get(&self.random_url).send().await?;
        debug!(status = %resp.status(), url = %resp.url(), "9gag random page resolved");
        Ok(Reply::text(resp.url().to_string()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use botplugs_common::User;

    use super::*;

    fn cmd() -> Cmd {
        Cmd::from_text("!", "!9gag", "#test", User::new("nick")).unwrap()
    }

    #[tokio::test]
    async fn replies_with_redirect_target() {
        let mut server = mockito::Server::new_async().await;
        let redirect = server
            .mock("GET", "/random")
            .with_status(302)
            .with_header("location", "/gag/aXYZ")
            .create_async()
            .await;
        let page = server
            .mock("GET", "/gag/aXYZ")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let command = GagCommand::new(reqwest::Client::new(), format!("{}/random", server.url()));
        let reply = command.execute(&cmd()).await.unwrap();

        assert_eq!(reply.messages, vec![format!("{}/gag/aXYZ", server.url())]);
        redirect.assert_async().await;
        page.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_site_is_an_error() {
        let command = GagCommand::new(reqwest::Client::new(), "http://127.0.0.1:1/random");
        assert!(command.execute(&cmd()).await.is_err());
    }
}
