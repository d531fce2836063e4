//! WebSocket connection manager.
//!
//! Handles connection lifecycle, automatic reconnection with exponential backoff,
//! and subscription restoration after reconnection. Each text frame goes to a
//! [`FrameHandler`]; if the handler rejects a frame the connection is dropped
//! and re-established, so a decode failure costs one reconnect, not the process.

use crate::backoff::backoff_with_jitter;
use crate::error::{WsError, WsResult};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL.
    pub url: String,
    /// Maximum consecutive reconnection attempts (0 = infinite).
    pub max_reconnect_attempts: u32,
    /// Base delay for exponential backoff.
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for exponential backoff.
    pub reconnect_max_delay_ms: u64,
    /// Drop the connection if no frame arrives within this window (0 = disabled).
    pub idle_timeout_ms: u64,
    /// Frames sent right after every (re)connect, e.g. subscribe requests.
    pub handshake: Vec<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_reconnect_attempts: 0, // Infinite
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 60000,
            idle_timeout_ms: 60000,
            handshake: Vec::new(),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Receives the frames of one connection.
pub trait FrameHandler: Send + Sync {
    /// Called once per established connection, before handshake frames go out.
    fn on_connected(&self) {}

    /// Handle one text frame. An error tears the connection down.
    fn handle_text(&self, text: &str) -> WsResult<()>;

    /// Observe state transitions (for health reporting).
    fn on_state_change(&self, _state: ConnectionState) {}
}

/// WebSocket connection manager.
pub struct ConnectionManager<H> {
    name: String,
    config: ConnectionConfig,
    handler: Arc<H>,
    state: Arc<RwLock<ConnectionState>>,
    reconnect_count: Arc<RwLock<u32>>,
    /// Cancellation token for graceful shutdown.
    shutdown_token: CancellationToken,
}

impl<H: FrameHandler> ConnectionManager<H> {
    /// Create a new connection manager.
    pub fn new(
        name: impl Into<String>,
        config: ConnectionConfig,
        handler: Arc<H>,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            handler,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            reconnect_count: Arc::new(RwLock::new(0)),
            shutdown_token,
        }
    }

    /// Get current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Consecutive failed attempts since the last established connection.
    pub fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.read()
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
        self.handler.on_state_change(state);
    }

    /// Connect and run the message loop until shutdown or until
    /// `max_reconnect_attempts` consecutive failures.
    pub async fn connect(&self) -> WsResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_shutdown() {
                info!(stream = %self.name, "Shutdown requested, exiting connect loop");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            self.set_state(ConnectionState::Connecting);

            let established = AtomicBool::new(false);
            match self.try_connect(&established).await {
                Ok(()) => {
                    info!(stream = %self.name, "WebSocket connection closed");
                }
                Err(e) => {
                    error!(stream = %self.name, error = %e, "WebSocket connection error");
                }
            }

            if self.is_shutdown() {
                info!(stream = %self.name, "Shutdown requested after disconnect, not reconnecting");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            // Only consecutive failures grow the backoff
            if established.load(Ordering::Acquire) {
                attempt = 0;
            }
            attempt += 1;
            *self.reconnect_count.write() = attempt;

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(stream = %self.name, attempt, "Max reconnection attempts reached");
                self.set_state(ConnectionState::Disconnected);
                return Err(WsError::ConnectionFailed(
                    "Max reconnection attempts reached".to_string(),
                ));
            }

            self.set_state(ConnectionState::Reconnecting);

            let delay = backoff_with_jitter(
                self.config.reconnect_base_delay_ms,
                self.config.reconnect_max_delay_ms,
                attempt,
            );
            warn!(stream = %self.name, attempt, delay_ms = delay.as_millis(), "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!(stream = %self.name, "Shutdown requested during backoff, exiting");
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self, established: &AtomicBool) -> WsResult<()> {
        info!(stream = %self.name, url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        established.store(true, Ordering::Release);
        *self.reconnect_count.write() = 0;
        self.handler.on_connected();
        self.set_state(ConnectionState::Connected);
        info!(stream = %self.name, "WebSocket connected");

        for frame in &self.config.handshake {
            debug!(stream = %self.name, %frame, "Sending handshake frame");
            write.send(Message::Text(frame.clone())).await?;
        }

        let idle_ms = self.config.idle_timeout_ms;
        let idle = Duration::from_millis(idle_ms);

        loop {
            let next = async {
                if idle.is_zero() {
                    Ok(read.next().await)
                } else {
                    tokio::time::timeout(idle, read.next()).await
                }
            };

            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!(stream = %self.name, "Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(stream = %self.name, ?e, "Failed to send Close frame during shutdown");
                    }
                    return Ok(());
                }

                msg = next => {
                    let msg = msg.map_err(|_| WsError::IdleTimeout(idle_ms))?;
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handler.handle_text(&text)?;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!(stream = %self.name, "Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(stream = %self.name, code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            return Err(e.into());
                        }
                        None => {
                            warn!(stream = %self.name, "WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
