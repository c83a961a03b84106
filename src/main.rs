use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;

use omemo_echo_bot::application::errors::{BotError, ConfigError};
use omemo_echo_bot::application::messaging::CommandParser;
use omemo_echo_bot::application::services::{CommandService, SessionController};
use omemo_echo_bot::domain::entities::{Address, CommandRegistry, Session};
use omemo_echo_bot::infrastructure::adapters::ConsoleTransport;
use omemo_echo_bot::infrastructure::config::{log_directives, Config};
use omemo_echo_bot::infrastructure::crypto::LoopbackEngine;

#[derive(Parser)]
#[command(name = "omemo-echo-bot")]
#[command(about = "An end-to-end encrypted chat command bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Sender used for console lines without an address
        #[arg(long, default_value = "console@localhost")]
        peer: String,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_directives(
            cli.verbose,
            rust_log.as_deref(),
        )))
        .init();

    match cli.command {
        Commands::Run { peer } => {
            if let Err(e) = run_bot(&cli.config, &peer) {
                fail(e);
            }
        }
        Commands::Version => {
            println!("omemo-echo-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(&cli.config),
    }
}

/// Startup errors are fatal: report and exit before any session exists
fn fail(message: impl std::fmt::Display) -> ! {
    tracing::error!("{}", message);
    std::process::exit(1);
}

fn load_config(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        Config::write_template(path)?;
        println!("Created config file, fill it!");
        std::process::exit(1);
    }

    let config = Config::load(path)?.with_env();
    config.validate()?;
    Ok(config)
}

fn run_bot(config_path: &str, peer: &str) -> Result<(), BotError> {
    let config = load_config(config_path)?;
    tracing::info!("Starting {}", config.bot.name);

    let identity = config.address()?;
    let credential = config.credential()?;
    let prefix = config.prefix()?;
    let peer = Address::parse(peer)?;

    let registry = Arc::new(CommandRegistry::new());
    let commands = CommandService::new(registry.clone(), prefix, &config.bot.name);
    commands.register_defaults()?;
    tracing::info!("Registered {} commands", registry.len());

    let session = Session::new(identity, credential, registry);
    let controller = SessionController::new(
        session,
        CommandParser::new(prefix),
        Arc::new(LoopbackEngine::new()),
        Arc::new(ConsoleTransport::new(peer)),
    );

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| fail(format!("Failed to start runtime: {}", e)));
    rt.block_on(controller.run())
}

fn init_config(path: &str) {
    if Path::new(path).exists() {
        println!("Config file {} already exists", path);
        return;
    }
    match Config::write_template(path) {
        Ok(()) => println!("Created {}, fill in account.jid and account.password", path),
        Err(e) => fail(format!("Failed to write {}: {}", path, e)),
    }
}
