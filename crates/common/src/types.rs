//! Values exchanged between the bot host and its plugins.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The author of an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub nick: String,
    pub real_name: String,
    pub is_bot: bool,
}

impl User {
    pub fn new(nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            id: nick.clone(),
            real_name: nick.clone(),
            nick,
            is_bot: false,
        }
    }
}

/// Where a message was posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelData {
    pub protocol: String,
    pub server: String,
    pub channel: String,
    pub human_name: String,
    pub is_private: bool,
}

/// Protocol-level details of an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub id: String,
    pub text: String,
    pub is_edited: bool,
}

/// An explicit command addressed to the bot (e.g. `!cpf 3`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cmd {
    /// Full, unmodified message text.
    pub raw: String,
    pub channel: String,
    pub channel_data: ChannelData,
    pub user: User,
    /// Message text with the command prefix removed.
    pub message: String,
    pub message_data: MessageData,
    /// Command name, lowercased.
    pub command: String,
    /// Everything after the command name, trimmed.
    pub raw_args: String,
    pub args: Vec<String>,
}

impl Cmd {
    /// Build a command as if `text` had been typed into `channel` by `user`.
    ///
    /// Returns `None` when `text` is not a command for the given prefix.
    pub fn from_text(prefix: &str, text: &str, channel: &str, user: User) -> Option<Self> {
        Self::from_passive(prefix, &PassiveCmd::new(text, channel, user))
    }

    /// Interpret an inbound message as a command, if it is one.
    pub fn from_passive(prefix: &str, msg: &PassiveCmd) -> Option<Self> {
        let (command, raw_args, args) = parse_command(prefix, &msg.raw)?;
        let trimmed = msg.raw.trim();
        let message = trimmed.strip_prefix(prefix).unwrap_or(trimmed).to_string();
        Some(Self {
            raw: msg.raw.clone(),
            channel: msg.channel.clone(),
            channel_data: msg.channel_data.clone(),
            user: msg.user.clone(),
            message,
            message_data: msg.message_data.clone(),
            command,
            raw_args,
            args,
        })
    }

    /// Key used for per-channel state: the user's nick in private chats,
    /// the channel name otherwise.
    pub fn channel_key(&self) -> &str {
        if self.channel_data.is_private {
            &self.user.nick
        } else {
            &self.channel
        }
    }

    /// Parse the argument at `index` as a signed integer.
    pub fn int_arg(&self, index: usize) -> Result<i64> {
        let raw = self
            .args
            .get(index)
            .ok_or_else(|| Error::message(format!("missing argument #{}", index + 1)))?;
        raw.parse::<i64>()
            .map_err(|e| Error::invalid_argument(raw.as_str(), e.to_string()))
    }
}

/// Any message the bot sees, whether or not it is a command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassiveCmd {
    pub raw: String,
    pub channel: String,
    pub channel_data: ChannelData,
    pub user: User,
    pub message_data: MessageData,
}

impl PassiveCmd {
    pub fn new(text: &str, channel: &str, user: User) -> Self {
        Self {
            raw: text.to_string(),
            channel: channel.to_string(),
            channel_data: ChannelData {
                channel: channel.to_string(),
                ..ChannelData::default()
            },
            user,
            message_data: MessageData {
                text: text.to_string(),
                ..MessageData::default()
            },
        }
    }
}

/// An outbound message about to be delivered, offered to filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCmd {
    /// Channel (or nick) the message is addressed to.
    pub target: String,
    pub message: String,
    pub user: Option<User>,
}

/// A message addressed to an explicit channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmdResult {
    pub channel: String,
    pub message: String,
}

impl CmdResult {
    pub fn new(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            message: message.into(),
        }
    }
}

/// What a command or passive handler wants to say.
///
/// `channel` overrides the reply target; by default replies go back to
/// the channel the trigger came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub channel: Option<String>,
    pub messages: Vec<String>,
}

impl Reply {
    /// No reply at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single message. Empty text means no reply.
    pub fn text(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self::lines([text])
    }

    /// Several messages, sent in order. Empty entries are dropped.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channel: None,
            messages: lines
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    /// Redirect the reply to `channel`.
    #[must_use]
    pub fn to(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Resolve into [`CmdResult`]s, sending to `default_channel` unless redirected.
    pub fn into_results(self, default_channel: &str) -> Vec<CmdResult> {
        let channel = self.channel.unwrap_or_else(|| default_channel.to_string());
        self.messages
            .into_iter()
            .map(|message| CmdResult::new(channel.clone(), message))
            .collect()
    }
}

/// Split `text` into `(command, raw_args, args)` when it starts with `prefix`.
///
/// The command name is lowercased. Returns `None` for plain messages and for
/// a bare prefix.
pub fn parse_command(prefix: &str, text: &str) -> Option<(String, String, Vec<String>)> {
    let rest = text.trim().strip_prefix(prefix)?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next().filter(|c| !c.is_empty())?.to_lowercase();
    let raw_args = parts.next().unwrap_or("").trim().to_string();
    let args = raw_args.split_whitespace().map(str::to_string).collect();
    Some((command, raw_args, args))
}
