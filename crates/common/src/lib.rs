//! Shared types, error definitions, and utilities used across all botplugs crates.

pub mod error;
pub mod expiring;
pub mod types;

pub use {
    error::{Error, Result},
    expiring::ExpiringMap,
    types::{
        ChannelData, Cmd, CmdResult, FilterCmd, MessageData, PassiveCmd, Reply, User,
        parse_command,
    },
};
