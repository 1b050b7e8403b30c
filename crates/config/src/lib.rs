//! Configuration loading, env substitution, and environment overrides.
//!
//! Config files: `botplugs.toml`, `botplugs.yaml`, or `botplugs.json`
//! Searched in `./` then the user config directory.
//!
//! Supports `${ENV_VAR}` substitution in all string values. The environment
//! variables understood by the individual plugins (`BITLY_TOKEN`,
//! `JIRA_BASE_URL`, ...) override file values.

pub mod env_subst;
pub mod error;
pub mod json_store;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    json_store::{load_json_file, save_json_file},
    loader::{apply_env_overrides, apply_env_overrides_with, config_dir, discover_and_load, load_config},
    schema::{
        BitlyConfig, BotConfig, BotplugsConfig, CachetConfig, DedupConfig, GagConfig,
        GodocConfig, JiraConfig, PluginsConfig, TwitterConfig,
    },
};
