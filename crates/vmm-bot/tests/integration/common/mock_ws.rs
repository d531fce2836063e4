//! Mock WebSocket server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections and count them
//! - Confirm `SUBSCRIBE` requests the way the reference venue does
//! - Record received messages
//! - Push frames to, or close, every open connection

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[derive(Debug, Clone)]
enum Control {
    Send(String),
    Close,
}

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    control_tx: broadcast::Sender<Control>,
    messages: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (control_tx, _) = broadcast::channel::<Control>(64);

        let messages_clone = messages.clone();
        let connections_clone = connections.clone();
        let control_clone = control_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let messages = messages_clone.clone();
                        let connections = connections_clone.clone();
                        // Subscribe before the handshake so no pushed frame is lost
                        let control_rx = control_clone.subscribe();
                        tokio::spawn(handle_connection(stream, messages, connections, control_rx));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            control_tx,
            messages,
            connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections accepted so far.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Get all received messages.
    pub async fn received_messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }

    /// Send a text frame to every open connection.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.control_tx.send(Control::Send(frame.into()));
    }

    /// Close every open connection with a normal close frame.
    pub fn close_all(&self) {
        let _ = self.control_tx.send(Control::Close);
    }

    /// Wait until at least `n` connections were accepted.
    pub async fn wait_for_connections(&self, n: u32, timeout: Duration) -> bool {
        wait_until(timeout, move || async move { self.connection_count().await >= n }).await
    }

    /// Wait until at least `n` messages were received.
    pub async fn wait_for_messages(&self, n: usize, timeout: Duration) -> bool {
        wait_until(timeout, move || async move { self.messages.lock().await.len() >= n }).await
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Poll `check` every 10ms until it holds or `timeout` passes.
pub async fn wait_until<F, Fut>(timeout: Duration, check: F) -> bool
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(timeout, async {
        loop {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}

async fn handle_connection(
    stream: TcpStream,
    messages: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<u32>>,
    mut control_rx: broadcast::Receiver<Control>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    *connections.lock().await += 1;

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    messages.lock().await.push(text.clone());

                    // Confirm subscriptions like the reference venue
                    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&text) {
                        if parsed.get("method") == Some(&serde_json::json!("SUBSCRIBE")) {
                            let response = serde_json::json!({
                                "result": null,
                                "id": parsed.get("id").cloned().unwrap_or(serde_json::Value::Null),
                            });
                            let _ = write.send(Message::Text(response.to_string())).await;
                        }
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = write.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            control = control_rx.recv() => match control {
                Ok(Control::Send(frame)) => {
                    if write.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Ok(Control::Close) => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let server = MockWsServer::start().await;
        assert!(server.url().starts_with("ws://127.0.0.1:"));
        server.shutdown().await;
    }
}
