//! zanrcon library interface

pub mod client;
pub mod config;
pub mod console;
pub mod relay;
pub mod transport;

pub use client::{ClientError, ClientOptions, RconHandle, connect_server, spawn};
pub use config::Config;
pub use relay::RelayServer;
pub use transport::Transport;
