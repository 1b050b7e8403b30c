use {anyhow::Result, async_trait::async_trait};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

pub struct HelloCommand;

#[async_trait]
impl Command for HelloCommand {
    fn name(&self) -> &str {
        "helloworld"
    }

    fn help(&self) -> &str {
        "Sends a 'Hello' message to you on the channel."
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        Ok(Reply::text(format!("Hello {}", cmd.user.nick)))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use botplugs_common::User;

    use super::*;

    #[tokio::test]
    async fn greets_the_sender() {
        let cmd = Cmd::from_text("!", "!helloworld", "#test", User::new("nick")).unwrap();
        let reply = HelloCommand.execute(&cmd).await.unwrap();
        assert_eq!(reply.messages, vec!["Hello nick"]);
    }
}
