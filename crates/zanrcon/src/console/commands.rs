//! Console command definitions and execution

use crate::client::{ClientError, RconHandle};
use thiserror::Error;
use zanrcore::SessionEvent;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: '{0}'")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Console commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a command on the server
    Say { text: String },

    /// Show the session state
    Status,

    /// Show help
    Help,

    /// Disconnect and leave
    Quit,
}

impl Command {
    /// Parse a command from one line of input
    ///
    /// The text of `say` is everything after the first space, kept verbatim.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim_end_matches(['\r', '\n']);
        let (word, rest) = match input.split_once(' ') {
            Some((word, rest)) => (word, Some(rest)),
            None => (input, None),
        };

        match word {
            "" => Err(CommandError::Empty),
            "say" => match rest {
                Some(text) if !text.trim().is_empty() => Ok(Command::Say {
                    text: text.to_string(),
                }),
                _ => Err(CommandError::Usage("say <command>")),
            },
            "status" => Ok(Command::Status),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Execute a console command against a running client
pub fn execute_command(cmd: Command, handle: &RconHandle) -> Result<(), ClientError> {
    match cmd {
        Command::Say { text } => handle.send_command(text),
        Command::Status => {
            println!("Session is {}", handle.state());
            Ok(())
        }
        Command::Help => {
            cmd_help();
            Ok(())
        }
        // Handled in console loop
        Command::Quit => Ok(()),
    }
}

/// One line describing an event for the terminal
pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Connect => "Connected".to_string(),
        SessionEvent::Error { cause } => format!("Error: {}", cause),
        SessionEvent::Message { text } => text.trim_end().to_string(),
        SessionEvent::Players { names } if names.is_empty() => "No players".to_string(),
        SessionEvent::Players { names } => {
            format!("Players ({}): {}", names.len(), names.join(", "))
        }
        SessionEvent::Admins { count } => format!("Other admins: {}", count),
        SessionEvent::Map { name } => format!("Map: {}", name),
    }
}

fn cmd_help() {
    println!("\nAvailable commands:");
    println!("  say <command>");
    println!("      Run a console command on the server");
    println!();
    println!("  status");
    println!("      Show the session state");
    println!();
    println!("  help");
    println!("      Show this help");
    println!();
    println!("  quit");
    println!("      Disconnect and exit");
    println!();
}
