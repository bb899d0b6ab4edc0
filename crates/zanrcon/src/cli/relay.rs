//! Relay server command

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use zanrcon::RelayServer;

pub async fn run(config_path: &str) -> Result<()> {
    let config = super::load_config(config_path)?;
    let (handle, _) = super::connect(&config).await?;

    let addr = (config.relay.address.as_str(), config.relay.port);
    let relay = RelayServer::bind(addr, handle.clone()).await?;

    let shutdown = CancellationToken::new();
    let mut relay_task = tokio::spawn(relay.run(shutdown.clone()));

    tokio::select! {
        result = &mut relay_task => result??,
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down...");
            shutdown.cancel();
            relay_task.await??;
        }
    }

    handle.shutdown().await;

    Ok(())
}
