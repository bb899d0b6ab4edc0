//! WebSocket relay: forwards text frames to the session and events back out
//!
//! Plain HTTP requests are answered with 404; any request carrying a
//! WebSocket upgrade is accepted regardless of path.

mod handler;

pub use handler::handle_connection;

use crate::client::RconHandle;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio_util::sync::CancellationToken;

/// Largest text frame accepted from a relay client
const MAX_MESSAGE_SIZE: usize = 8 * 1024;

pub struct RelayServer {
    listener: TcpListener,
    handle: RconHandle,
}

impl RelayServer {
    pub async fn bind(addr: impl ToSocketAddrs, handle: RconHandle) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind relay listener")?;
        Ok(Self { listener, handle })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve relay clients until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!("Relay listening on {}", self.local_addr()?);

        let app = router(self.handle);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Relay server failed")?;

        tracing::info!("Relay stopped");
        Ok(())
    }
}

fn router(handle: RconHandle) -> Router {
    Router::new().fallback(upgrade).with_state(handle)
}

async fn upgrade(
    State(handle): State<RconHandle>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match ws {
        Ok(ws) => ws
            .max_message_size(MAX_MESSAGE_SIZE)
            .on_upgrade(move |socket| async move {
                if let Err(e) = handle_connection(socket, peer, handle).await {
                    tracing::warn!("Relay client {} failed: {}", peer, e);
                }
            }),
        Err(_) => {
            tracing::info!("Received request for {} from {}", uri, peer);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
