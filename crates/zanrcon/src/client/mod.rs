//! Asynchronous RCON client
//!
//! One background task owns the session, its socket and the keepalive timer.
//! [`RconHandle`] enqueues requests for that task and never blocks; results
//! arrive as [`SessionEvent`]s.

mod driver;

use crate::config::{Config, ConfigError};
use crate::transport::{Transport, bind_udp};
use driver::{Driver, Request};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use zanrcore::protocol::{KEEPALIVE_INTERVAL, PROTOCOL_VERSION};
use zanrcore::{HuffmanCodec, RconCodec, Session, SessionEvent, SessionState};
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Client task has stopped")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for a client task
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub huffman: Arc<HuffmanCodec>,
    pub protocol_version: u8,
    pub keepalive: Duration,
    /// Events buffered per subscriber before the slowest one lags
    pub event_capacity: usize,
}

impl ClientOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            huffman: Arc::new(config.huffman()?),
            protocol_version: config.protocol.version,
            keepalive: config.keepalive(),
            ..Self::default()
        })
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            huffman: Arc::new(HuffmanCodec::default()),
            protocol_version: PROTOCOL_VERSION,
            keepalive: KEEPALIVE_INTERVAL,
            event_capacity: 256,
        }
    }
}

/// Cloneable handle to a running client task
#[derive(Debug, Clone)]
pub struct RconHandle {
    requests: mpsc::UnboundedSender<Request>,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Receiver<SessionState>,
}

impl RconHandle {
    /// Resolve `host` and start the handshake
    pub fn connect(
        &self,
        password: impl Into<String>,
        port: u16,
        host: impl Into<String>,
    ) -> Result<(), ClientError> {
        self.request(Request::Connect {
            password: Zeroizing::new(password.into()),
            host: host.into(),
            port,
        })
    }

    /// Leave the session without waiting for the server
    pub fn disconnect(&self) -> Result<(), ClientError> {
        self.request(Request::Disconnect)
    }

    /// Run a console command on the server
    pub fn send_command(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.request(Request::Command(text.into()))
    }

    /// Receive events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Most recent session state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session reaches `state`
    pub async fn wait_for_state(&self, state: SessionState) -> Result<(), ClientError> {
        let mut watcher = self.state.clone();
        watcher
            .wait_for(|current| *current == state)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::Closed)
    }

    /// Stop the task, disconnecting first if needed, and wait for it to exit
    pub async fn shutdown(&self) {
        if self.requests.send(Request::Shutdown).is_ok() {
            self.requests.closed().await;
        }
    }

    fn request(&self, request: Request) -> Result<(), ClientError> {
        self.requests.send(request).map_err(|_| ClientError::Closed)
    }
}

/// Start a client task on `transport`
///
/// The returned receiver is subscribed before the task starts, so it sees
/// every event.
pub fn spawn<T: Transport>(
    transport: T,
    options: ClientOptions,
) -> (RconHandle, broadcast::Receiver<SessionEvent>) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = broadcast::channel(options.event_capacity.max(1));
    let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);

    let session = Session::new(RconCodec::new(options.huffman))
        .with_protocol_version(options.protocol_version);

    let driver = Driver::new(
        session,
        transport,
        request_rx,
        event_tx.clone(),
        state_tx,
        options.keepalive,
    );
    tokio::spawn(driver.run());

    let handle = RconHandle {
        requests: request_tx,
        events: event_tx,
        state: state_rx,
    };
    (handle, event_rx)
}

/// Bind a UDP socket, start a client and begin connecting to `host:port`
pub async fn connect_server(
    password: impl Into<String>,
    host: impl Into<String>,
    port: u16,
    options: ClientOptions,
) -> Result<(RconHandle, broadcast::Receiver<SessionEvent>), ClientError> {
    let socket = bind_udp().await?;
    let (handle, events) = spawn(socket, options);
    handle.connect(password, port, host)?;
    Ok((handle, events))
}
