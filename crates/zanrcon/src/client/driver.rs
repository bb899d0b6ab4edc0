//! Client task: the single sequential context a session runs on

use crate::transport::{Transport, resolve_ipv4};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use zanrcore::protocol::MAX_DATAGRAM_SIZE;
use zanrcore::{Output, Session, SessionError, SessionEvent, SessionState};
use zeroize::Zeroizing;

/// Work queued by an [`RconHandle`](super::RconHandle)
pub(crate) enum Request {
    Connect {
        password: Zeroizing<String>,
        host: String,
        port: u16,
    },
    Disconnect,
    Command(String),
    Shutdown,
}

pub(crate) struct Driver<T> {
    session: Session,
    transport: T,
    requests: mpsc::UnboundedReceiver<Request>,
    events: broadcast::Sender<SessionEvent>,
    state: watch::Sender<SessionState>,
    keepalive_period: Duration,
    /// Present only while connected
    keepalive: Option<Interval>,
}

impl<T: Transport> Driver<T> {
    pub(crate) fn new(
        session: Session,
        transport: T,
        requests: mpsc::UnboundedReceiver<Request>,
        events: broadcast::Sender<SessionEvent>,
        state: watch::Sender<SessionState>,
        keepalive_period: Duration,
    ) -> Self {
        Self {
            session,
            transport,
            requests,
            events,
            state,
            keepalive_period,
            keepalive: None,
        }
    }

    /// Process requests, datagrams and keepalive ticks one at a time
    pub(crate) async fn run(mut self) {
        // One spare byte so oversized datagrams are detected rather than cut
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE + 1];

        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle_request(request).await,
                },

                result = self.transport.recv_from(&mut buf) => match result {
                    Ok((len, from)) => {
                        let outputs = self.session.handle_datagram(&buf[..len], from);
                        self.perform(outputs).await;
                    }
                    Err(e) => {
                        tracing::warn!("Error receiving datagram: {}", e);
                    }
                },

                _ = next_tick(&mut self.keepalive) => {
                    if let Some(pong) = self.session.pong() {
                        tracing::debug!("Sending pong");
                        self.perform(vec![pong]).await;
                    }
                }
            }
        }

        if self.session.state() == SessionState::Connected {
            if let Ok(outputs) = self.session.disconnect() {
                self.perform(outputs).await;
            }
        }

        tracing::debug!("Client task stopped");
    }

    async fn handle_request(&mut self, request: Request) {
        let result = match request {
            Request::Connect {
                password,
                host,
                port,
            } => self.connect(password, &host, port).await,
            Request::Disconnect => self.session.disconnect(),
            Request::Command(text) => self.session.send_command(text),
            Request::Shutdown => Ok(Vec::new()),
        };

        match result {
            Ok(outputs) => self.perform(outputs).await,
            Err(e) => {
                tracing::warn!("Request failed: {}", e);
                self.emit(SessionEvent::error(e));
            }
        }
    }

    async fn connect(
        &mut self,
        mut password: Zeroizing<String>,
        host: &str,
        port: u16,
    ) -> Result<Vec<Output>, SessionError> {
        // Refuse before paying for a lookup
        if self.session.state() != SessionState::Disconnected {
            return Err(SessionError::InvalidState {
                operation: "connect",
                state: self.session.state(),
            });
        }

        let remote = resolve_ipv4(host, port)
            .await
            .map_err(|e| SessionError::Network {
                host: host.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!("Resolved {} to {}", host, remote);

        // Moves the buffer into the session without copying it
        self.session.connect(std::mem::take(&mut *password), remote)
    }

    async fn perform(&mut self, outputs: Vec<Output>) {
        // Publish before emitting so subscribers observe the new state
        self.state.send_replace(self.session.state());

        for output in outputs {
            match output {
                Output::Send { packet, to } => {
                    let datagram = self.session.codec().encode_packet(&packet);
                    if let Err(e) = self.transport.send_to(&datagram, to).await {
                        tracing::warn!("Failed to send {:?} to {}: {}", packet.code(), to, e);
                        self.emit(SessionEvent::error(SessionError::Transport(e.to_string())));
                    }
                }
                Output::Emit(event) => self.emit(event),
                Output::StartKeepalive => {
                    let period = self.keepalive_period;
                    let mut interval = interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    self.keepalive = Some(interval);
                }
                Output::StopKeepalive => {
                    self.keepalive = None;
                }
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        tracing::trace!("Emitting {:?}", event);
        if self.events.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}

/// Next keepalive tick, or never while no keepalive is running
async fn next_tick(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
