//! Configuration info command

use anyhow::Result;

pub fn run(config_path: &str) -> Result<()> {
    let config = super::load_config(config_path)?;

    println!("Client Information");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Server:      {}:{}", config.server.host, config.server.port);
    println!(
        "Password:    {}",
        if config.server.password.is_some() { "stored" } else { "prompted" }
    );
    println!("Relay:       {}:{}", config.relay.address, config.relay.port);
    println!();
    println!("Protocol version: {}", config.protocol.version);
    println!("Keepalive:        {}s", config.protocol.keepalive_secs);
    println!("Bit order:        {:?}", config.protocol.bit_order);
    match &config.protocol.frequencies_file {
        Some(path) => println!("Frequencies:      {}", path.display()),
        None => println!("Frequencies:      built-in"),
    }

    Ok(())
}
