mod console;
mod setup;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use botplugs_config::BotplugsConfig;

#[derive(Parser)]
#[command(name = "botplugs", about = "Chat bot plugins on the console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery in ./ and the user config dir).
    #[arg(long, global = true, env = "BOTPLUGS_CONFIG")]
    config: Option<PathBuf>,

    /// Command prefix (overrides config value).
    #[arg(long, global = true)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin (default when no subcommand is provided).
    Run,
    /// Handle a single message, print the replies and exit.
    Exec {
        text: String,
        #[arg(long, default_value = console::CONSOLE_CHANNEL)]
        channel: String,
    },
    /// List registered plugins.
    List,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // stdout carries bot output, logs go to stderr.
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<BotplugsConfig> {
    let mut config = match &cli.config {
        Some(path) => botplugs_config::load_config(path)?,
        None => botplugs_config::discover_and_load(),
    };
    botplugs_config::apply_env_overrides(&mut config);
    if let Some(prefix) = &cli.prefix {
        config.bot.prefix = prefix.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "botplugs starting");

    let config = load_config(&cli)?;
    let http = setup::http_client()?;
    let registry = setup::build_registry(&config, &http).await?;

    match cli.command {
        None | Some(Commands::Run) => console::run(Arc::new(registry), console::current_user()).await,
        Some(Commands::Exec { text, channel }) => {
            let user = console::current_user();
            for result in console::handle_line(&registry, &text, &channel, &user).await {
                println!("{}", console::render(&result));
            }
            Ok(())
        },
        Some(Commands::List) => {
            for line in setup::describe(&registry) {
                println!("{line}");
            }
            Ok(())
        },
    }
}
