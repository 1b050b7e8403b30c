use {anyhow::Result, async_trait::async_trait, uuid::Uuid};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

/// `!guid [upper]`: a random v4 UUID.
pub struct GuidCommand;

#[async_trait]
impl Command for GuidCommand {
    fn name(&self) -> &str {
        "guid"
    }

    fn help(&self) -> &str {
        "Generates UUID"
    }

    fn usage(&self) -> &str {
        "upper"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let id = Uuid::new_v4().hyphenated().to_string();
        let upper = cmd
            .args
            .first()
            .is_some_and(|a| a.eq_ignore_ascii_case("upper"));
        Ok(Reply::text(if upper { id.to_uppercase() } else { id }))
    }
}
