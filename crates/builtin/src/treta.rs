use {
    anyhow::Result,
    async_trait::async_trait,
    rand::seq::IndexedRandom,
};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

use crate::crypto::INVALID_AMOUNT_OF_PARAMS;

const INVALID_PARAM: &str = "Invalid parameter";

const QUOTES: &[(&str, &[&str])] = &[
    ("DELPHI", &[
        "Delphi. Now there's a name I haven't heard in a long time.",
        "Access Violation at address 00405772 in module 'Project1.exe'. Read of address 00000388.",
        "Develop iOS applications with RAD Studio",
        "It’s not difficult to read and listen about the wonders of Embarcadero DataSnap technology around the world.",
    ]),
    ("JAVA", &[
        "You're using Java? Well there's your problem.",
        "I had a problem so I thought to use Java. Now I have a ProblemFactory.",
    ]),
    ("JAVASCRIPT", &[
        "Javascript is not funny",
        "JavaScript why you no works?",
        "Brace yourself. A new Javascript framework is coming.",
    ]),
    ("PYTHON", &["We'll can do cool things... even with Python"]),
    ("RUBY", &[
        "Ruby is slower than Internet Explorer",
        "Can Rails Scale? NOOOOO!",
        "Why is Ruby so slow?",
        "I hate managing inventory and the game drops more weapon than the rails can handle the requests",
        "Ruby on Rails? Pleaaase. Do you even code, bro?",
        "The classic Hello, world! program is really easy with Ruby. You just need to know the name of the gem you want to install.",
        "Python > Ruby",
        "even PHP > Ruby",
    ]),
    ("VIM", &[
        "Emacs > VIM",
        "Sublime Text > VIM",
        "even Notepad > VIM",
        "VIM... Why can't I quit you?!",
        "Vim Is Too Mainstream. I'm Switching To Emacs",
    ]),
    ("WINDOWS", &[
        "If We Add A Start Menu To Windows 8 We Can Call It Windows 10",
        "Keyboard not responding. Press any key to continue.",
        "A system call that should never fail has failed.",
        "Bluescreen has performed an illegal operation. Bluescreen must be closed.",
        "An error occurred whilst trying to load the previous error.",
        "Help and Support Error: Windows cannot open Help and Support because a system service is not running. To fix this problems, start the service named Help and Support",
    ]),
];

fn quotes_for(topic: &str) -> Option<&'static [&'static str]> {
    QUOTES
        .iter()
        .find(|(key, _)| *key == topic)
        .map(|(_, quotes)| *quotes)
}

/// `!treta [topic]`: sowing discord.
pub struct TretaCommand;

#[async_trait]
impl Command for TretaCommand {
    fn name(&self) -> &str {
        "treta"
    }

    fn help(&self) -> &str {
        "sowing discord"
    }

    fn usage(&self) -> &str {
        "vim"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let mut rng = rand::rng();
        let quotes = match cmd.args.as_slice() {
            [] => QUOTES.choose(&mut rng).map(|(_, quotes)| *quotes),
            [topic] => quotes_for(&topic.to_uppercase()),
            _ => return Ok(Reply::text(INVALID_AMOUNT_OF_PARAMS)),
        };
        let quote = quotes.and_then(|q| q.choose(&mut rng).copied());
        Ok(Reply::text(quote.unwrap_or(INVALID_PARAM)))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {botplugs_common::User, rstest::rstest};

    use super::*;

    async fn run(text: &str) -> String {
        let cmd = Cmd::from_text("!", text, "#test", User::new("nick")).unwrap();
        TretaCommand.execute(&cmd).await.unwrap().messages.remove(0)
    }

    #[tokio::test]
    async fn random_topic() {
        let quote = run("!treta").await;
        assert!(QUOTES.iter().any(|(_, q)| q.contains(&quote.as_str())));
    }

    #[rstest]
    #[case("vim", "VIM")]
    #[case("JavaScript", "JAVASCRIPT")]
    #[tokio::test]
    async fn topic_is_case_insensitive(#[case] arg: &str, #[case] topic: &str) {
        let quote = run(&format!("!treta {arg}")).await;
        assert!(quotes_for(topic).unwrap().contains(&quote.as_str()));
    }

    #[rstest]
    #[case("!treta cobol", INVALID_PARAM)]
    #[case("!treta vim java", INVALID_AMOUNT_OF_PARAMS)]
    #[tokio::test]
    async fn rejects_bad_input(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(run(text).await, expected);
    }
}
