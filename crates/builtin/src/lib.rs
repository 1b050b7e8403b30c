//! Plugins that need nothing beyond the bot itself (and, for `9gag` and
//! `godoc`, a plain HTTP GET).

pub mod crypto;
pub mod dedup;
pub mod document;
pub mod encoding;
pub mod gag;
pub mod godoc;
pub mod guid;
pub mod helloworld;
pub mod lula;
pub mod silence;
pub mod treta;

use std::sync::Arc;

use tracing::debug;

use {botplugs_config::BotplugsConfig, botplugs_plugins::PluginRegistry};

pub use {
    crypto::CryptoCommand,
    dedup::DedupFilter,
    document::{CNPJ, CPF, DocumentCommand, DocumentKind},
    encoding::{DecodeCommand, EncodeCommand},
    gag::GagCommand,
    godoc::GodocCommand,
    guid::GuidCommand,
    helloworld::HelloCommand,
    lula::LulaPassive,
    silence::{SilenceCommand, SilenceFilter, SilenceState},
    treta::TretaCommand,
};

/// Plugin names understood by `plugins.enabled` / `plugins.disabled`.
pub const PLUGIN_NAMES: &[&str] = &[
    "9gag",
    "cnpj",
    "cpf",
    "crypto",
    "dedup",
    "encoding",
    "godoc",
    "guid",
    "helloworld",
    "lula",
    "silence",
    "treta",
];

/// Register every enabled builtin plugin.
pub fn register_all(registry: &mut PluginRegistry, config: &BotplugsConfig, client: &reqwest::Client) {
    let enabled = |name: &str| {
        let on = config.plugins.is_enabled(name);
        if !on {
            debug!(plugin = name, "builtin plugin disabled");
        }
        on
    };

    if enabled("cpf") {
        registry.register_command(Arc::new(DocumentCommand::new(CPF)));
    }
    if enabled("cnpj") {
        registry.register_command(Arc::new(DocumentCommand::new(CNPJ)));
    }
    if enabled("crypto") {
        registry.register_command(Arc::new(CryptoCommand));
    }
    if enabled("encoding") {
        registry.register_command(Arc::new(EncodeCommand));
        registry.register_command(Arc::new(DecodeCommand));
    }
    if enabled("guid") {
        registry.register_command(Arc::new(GuidCommand));
    }
    if enabled("treta") {
        registry.register_command(Arc::new(TretaCommand));
    }
    if enabled("helloworld") {
        registry.register_command(Arc::new(HelloCommand));
    }
    if enabled("lula") {
        registry.register_passive(Arc::new(LulaPassive));
    }
    if enabled("silence") {
        let state = Arc::new(SilenceState::new());
        registry.register_command(Arc::new(SilenceCommand::new(Arc::clone(&state))));
        registry.register_filter(Arc::new(SilenceFilter::new(state)));
    }
    if enabled("dedup") {
        registry.register_filter(Arc::new(DedupFilter::from_minutes(
            config.dedup.timeout_minutes,
        )));
    }
    if enabled("9gag") {
        registry.register_command(Arc::new(GagCommand::new(
            client.clone(),
            config.gag.random_url.clone(),
        )));
    }
    if enabled("godoc") {
        registry.register_command(Arc::new(GodocCommand::new(
            client.clone(),
            config.godoc.search_url.clone(),
        )));
    }
}
