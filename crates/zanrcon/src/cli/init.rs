//! Configuration initialization command

use anyhow::{Result, bail};
use std::path::Path;
use zanrcon::Config;

pub fn run(config_path: &str) -> Result<()> {
    if Path::new(config_path).exists() {
        bail!(
            "Configuration file already exists: {} (remove it first or use a different path)",
            config_path
        );
    }

    let config = Config::default();
    config.save(config_path)?;

    println!("✓ Configuration created: {}", config_path);
    println!();
    println!("Edit server.host and server.port, then connect with:");
    println!("  zanrcon console");
    println!();
    println!("The password is prompted for unless server.password is set.");
    println!("Set protocol.frequencies_file to the server's Huffman table (a JSON");
    println!("array of 256 weights) if it differs from the built-in one.");

    Ok(())
}
