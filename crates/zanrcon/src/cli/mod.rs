//! Subcommand implementations

pub mod console;
pub mod info;
pub mod init;
pub mod relay;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use zanrcon::{ClientOptions, Config, RconHandle, connect_server};
use zanrcore::SessionEvent;

/// Load and check the configuration at `path`
fn load_config(path: &str) -> Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Start a client and begin connecting to the configured server
async fn connect(config: &Config) -> Result<(RconHandle, broadcast::Receiver<SessionEvent>)> {
    let password = match &config.server.password {
        Some(password) => password.clone(),
        None => {
            let prompt = format!("RCON password for {}: ", config.server.host);
            tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt))
                .await?
                .context("Failed to read password")?
        }
    };

    let options = ClientOptions::from_config(config)?;

    tracing::info!(
        "Connecting to {}:{}",
        config.server.host,
        config.server.port
    );

    let client = connect_server(password, config.server.host.clone(), config.server.port, options)
        .await
        .context("Failed to start client")?;
    Ok(client)
}
