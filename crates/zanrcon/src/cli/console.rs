//! Interactive console command

use anyhow::Result;
use zanrcon::console::run_console;

pub async fn run(config_path: &str) -> Result<()> {
    let config = super::load_config(config_path)?;
    let (handle, events) = super::connect(&config).await?;

    run_console(handle, events).await
}
