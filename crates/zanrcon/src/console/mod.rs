//! Interactive console for a remote server

mod commands;

pub use commands::{Command, CommandError, describe, execute_command};

use crate::client::RconHandle;
use anyhow::Result;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use zanrcore::SessionEvent;

/// Run the interactive console loop until quit, EOF or the task stops
pub async fn run_console(
    handle: RconHandle,
    mut events: broadcast::Receiver<SessionEvent>,
) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();

    println!("\n=== Zandronum RCON Console ===");
    println!("Type 'help' for available commands");
    println!();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                None => {
                    println!("\nEOF detected, disconnecting...");
                    break;
                }
                Some(line) => {
                    if line.trim().is_empty() {
                        prompt()?;
                        continue;
                    }

                    match Command::parse(&line) {
                        Ok(Command::Quit) => {
                            println!("Disconnecting...");
                            break;
                        }
                        Ok(cmd) => {
                            if let Err(e) = execute_command(cmd, &handle) {
                                eprintln!("Error: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            println!("Type 'help' for available commands");
                        }
                    }
                    prompt()?;
                }
            },

            event = events.recv() => match event {
                Ok(event) => {
                    println!("\r{}", describe(&event));
                    prompt()?;
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Console skipped {} events", n);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Disconnects first when connected
    handle.shutdown().await;

    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}
