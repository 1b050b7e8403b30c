use {
    anyhow::Result,
    async_trait::async_trait,
    md5::Md5,
    sha1::Sha1,
    sha2::{Digest, Sha256},
};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

pub(crate) const INVALID_AMOUNT_OF_PARAMS: &str = "Invalid amount of parameters";
pub(crate) const INVALID_PARAMS: &str = "Invalid parameters";

/// `!crypto <algorithm> <text…>`: hex digest of the text.
pub struct CryptoCommand;

pub fn digest(algorithm: &str, data: &[u8]) -> Option<String> {
    let hex = match algorithm.to_uppercase().as_str() {
        "MD5" => format!("{:x}", Md5::digest(data)),
        "SHA1" | "SHA-1" => format!("{:x}", Sha1::digest(data)),
        "SHA256" | "SHA-256" => format!("{:x}", Sha256::digest(data)),
        _ => return None,
    };
    Some(hex)
}

#[async_trait]
impl Command for CryptoCommand {
    fn name(&self) -> &str {
        "crypto"
    }

    fn help(&self) -> &str {
        "Encrypts the input data from its hash value"
    }

    fn usage(&self) -> &str {
        "md5 enter here text to encrypt"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let [algorithm, words @ ..] = cmd.args.as_slice() else {
            return Ok(Reply::text(INVALID_AMOUNT_OF_PARAMS));
        };
        if words.is_empty() {
            return Ok(Reply::text(INVALID_AMOUNT_OF_PARAMS));
        }
        let input = words.join(" ");
        Ok(Reply::text(
            digest(algorithm, input.as_bytes()).unwrap_or_else(|| INVALID_PARAMS.to_string()),
        ))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {botplugs_common::User, rstest::rstest};

    use super::*;

    async fn run(text: &str) -> String {
        let cmd = Cmd::from_text("!", text, "#test", User::new("nick")).unwrap();
        CryptoCommand.execute(&cmd).await.unwrap().messages.join("\n")
    }

    #[rstest]
    #[case("!crypto md5 go-chat-bot", "1120d1df84fec8a0557e8737ac021651")]
    #[case(
        "!crypto MD5 The Go Programming Language",
        "adb505803d3502f2f00c88365ab85bf0"
    )]
    #[case("!crypto sha1 go-chat-bot", "385ca248ffebb5ed7f62d1ea2b0545cff80ac18e")]
    #[case(
        "!crypto SHA-1 The Go Programming Language",
        "88a93e668044877a845097aaf620532a232bfd34"
    )]
    #[case(
        "!crypto sha256 abc",
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    )]
    #[case("!crypto", INVALID_AMOUNT_OF_PARAMS)]
    #[case("!crypto md5", INVALID_AMOUNT_OF_PARAMS)]
    #[case("!crypto rot13 text", INVALID_PARAMS)]
    #[tokio::test]
    async fn hashes(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(run(text).await, expected);
    }
}
