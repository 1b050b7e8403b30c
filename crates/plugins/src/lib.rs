//! Plugin host seam: the traits plugins implement, the registry the host
//! dispatches through, and the scheduler for periodic commands.
//!
//! Plugins never depend on each other. The host owns a [`PluginRegistry`],
//! feeds it inbound messages and passes every outbound message through the
//! registered filters.

pub mod error;
pub mod help;
pub mod plugin;
pub mod registry;
pub mod runner;
pub mod schedule;

pub use {
    error::{Error, Result},
    plugin::{Command, FilterCommand, PassiveCommand, PeriodicCommand},
    registry::PluginRegistry,
    runner::{OutboundSink, PeriodicRunner},
    schedule::PeriodicSchedule,
};
