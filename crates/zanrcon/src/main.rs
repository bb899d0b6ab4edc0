//! Zandronum remote console client (zanrcon)

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zanrcon::Config;

mod cli;

#[derive(Parser)]
#[command(name = "zanrcon")]
#[command(about = "Zandronum remote console client", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "zanrcon.json")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Connect and run the interactive console
    Console,

    /// Connect and relay commands and events over WebSocket
    Relay,

    /// Show configuration information
    Info,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The configured level applies only when RUST_LOG is unset
    let level = Config::load(&cli.config)
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    match cli.command {
        Commands::Init => cli::init::run(&cli.config),
        Commands::Console => cli::console::run(&cli.config).await,
        Commands::Relay => cli::relay::run(&cli.config).await,
        Commands::Info => cli::info::run(&cli.config),
        Commands::Version => {
            println!("zanrcon version {}", env!("CARGO_PKG_VERSION"));
            println!("Protocol version: {}", zanrcore::protocol::PROTOCOL_VERSION);
            Ok(())
        }
    }
}
