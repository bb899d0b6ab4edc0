//! Relay connection handler

use crate::client::RconHandle;
use crate::console::Command;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::sync::broadcast::error::RecvError;

/// Serve one relay client until it disconnects or the client task stops
pub async fn handle_connection(
    socket: WebSocket,
    peer: SocketAddr,
    handle: RconHandle,
) -> Result<()> {
    let mut events = handle.subscribe();
    let (mut sink, mut stream) = socket.split();

    tracing::info!("Relay client connected from {}", peer);

    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => relay_text(&handle, peer, text.as_str())?,
                Some(Ok(Message::Close(_))) | None => break,
                // Binary frames are ignored, pings are answered by the socket
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("Error reading from relay client {}: {}", peer, e);
                    break;
                }
            },

            event = events.recv() => match event {
                Ok(event) => {
                    let line = serde_json::to_string(&event)?;
                    if let Err(e) = sink.send(Message::Text(line.into())).await {
                        tracing::warn!("Failed to write to relay client {}: {}", peer, e);
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Relay client {} skipped {} events", peer, n);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("Relay client {} disconnected", peer);

    Ok(())
}

/// Forward `say` text to the server; anything else is dropped
fn relay_text(handle: &RconHandle, peer: SocketAddr, text: &str) -> Result<()> {
    match Command::parse(text) {
        Ok(Command::Say { text }) => {
            tracing::debug!("Relay {} command: {}", peer, text);
            handle.send_command(text)?;
        }
        Ok(other) => {
            tracing::debug!("Relay {} ignored {:?}", peer, other);
        }
        Err(e) => {
            tracing::debug!("Relay {} ignored message: {}", peer, e);
        }
    }
    Ok(())
}
