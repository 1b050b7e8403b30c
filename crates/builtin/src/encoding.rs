//! `!encode` and `!decode`. Only base64 is supported.

use {
    anyhow::Result,
    async_trait::async_trait,
    base64::{Engine, engine::general_purpose::STANDARD},
};

use {
    botplugs_common::{Cmd, Reply},
    botplugs_plugins::Command,
};

use crate::crypto::{INVALID_AMOUNT_OF_PARAMS, INVALID_PARAMS};

const BASE64: &str = "base64";

pub struct EncodeCommand;

pub struct DecodeCommand;

#[async_trait]
impl Command for EncodeCommand {
    fn name(&self) -> &str {
        "encode"
    }

    fn help(&self) -> &str {
        "Encodes the given string"
    }

    fn usage(&self) -> &str {
        "base64 The Go Programming Language"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let reply = match cmd.args.as_slice() {
            [] | [_] => INVALID_AMOUNT_OF_PARAMS.to_string(),
            [encoding, words @ ..] if encoding == BASE64 => STANDARD.encode(words.join(" ")),
            _ => INVALID_PARAMS.to_string(),
        };
        Ok(Reply::text(reply))
    }
}

#[async_trait]
impl Command for DecodeCommand {
    fn name(&self) -> &str {
        "decode"
    }

    fn help(&self) -> &str {
        "Decodes the given string"
    }

    fn usage(&self) -> &str {
        "base64 VGhlIEdvIFByb2dyYW1taW5nIExhbmd1YWdl"
    }

    async fn execute(&self, cmd: &Cmd) -> Result<Reply> {
        let reply = match cmd.args.as_slice() {
            [encoding, data] if encoding == BASE64 => match STANDARD.decode(data) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => format!("Error: {e}"),
            },
            [_, _] => INVALID_PARAMS.to_string(),
            _ => INVALID_AMOUNT_OF_PARAMS.to_string(),
        };
        Ok(Reply::text(reply))
    }
}
