//! Reconnecting WebSocket client.
//!
//! Provides robust WebSocket connectivity with:
//! - Automatic reconnection with exponential backoff
//! - Handshake (subscribe) frames replayed on every connect
//! - Idle timeout detection
//! - Frame dispatch to a [`FrameHandler`]; a handler error drops the
//!   connection and resubscribes instead of killing the process

pub mod backoff;
pub mod connection;
pub mod error;

pub use backoff::{backoff_delay_ms, backoff_with_jitter};
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState, FrameHandler};
pub use error::{WsError, WsResult};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
