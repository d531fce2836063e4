//! Per-stream health.
//!
//! Every subscription reports its connection state here. The strategy
//! refuses to quote while a required stream is not live, and the status
//! endpoint exposes the table as-is.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};
use vmm_ws::ConnectionState;

/// The subscriptions the agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    MarketData,
    Accounts,
    Orders,
    Positions,
    LiquidityProvisions,
    ReferencePrice,
}

impl StreamKind {
    pub const ALL: [StreamKind; 6] = [
        Self::MarketData,
        Self::Accounts,
        Self::Orders,
        Self::Positions,
        Self::LiquidityProvisions,
        Self::ReferencePrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketData => "market_data",
            Self::Accounts => "accounts",
            Self::Orders => "orders",
            Self::Positions => "positions",
            Self::LiquidityProvisions => "liquidity_provisions",
            Self::ReferencePrice => "reference_price",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    Connecting,
    Live,
    Reconnecting,
    Disconnected,
}

impl From<ConnectionState> for StreamStatus {
    fn from(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Disconnected => Self::Disconnected,
            ConnectionState::Connecting => Self::Connecting,
            ConnectionState::Connected => Self::Live,
            ConnectionState::Reconnecting => Self::Reconnecting,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    status: StreamStatus,
    reconnects: u64,
    last_update: Option<Instant>,
    last_update_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new() -> Self {
        Self {
            status: StreamStatus::Connecting,
            reconnects: 0,
            last_update: None,
            last_update_at: None,
        }
    }
}

/// Serializable view of one stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamHealthView {
    pub stream: StreamKind,
    pub status: StreamStatus,
    pub reconnects: u64,
    pub last_update: Option<DateTime<Utc>>,
}

/// Health table shared as `Arc<StreamHealth>`.
#[derive(Debug, Default)]
pub struct StreamHealth {
    streams: RwLock<BTreeMap<StreamKind, Entry>>,
}

impl StreamHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every stream in `kinds` present and `Connecting`.
    pub fn with_streams(kinds: &[StreamKind]) -> Self {
        let health = Self::new();
        {
            let mut streams = health.streams.write();
            for kind in kinds {
                streams.insert(*kind, Entry::new());
            }
        }
        health
    }

    /// Record a status transition. Entering `Reconnecting` counts a reconnect.
    pub fn set_status(&self, kind: StreamKind, status: StreamStatus) {
        let mut streams = self.streams.write();
        let entry = streams.entry(kind).or_insert_with(Entry::new);
        if status == StreamStatus::Reconnecting && entry.status != StreamStatus::Reconnecting {
            entry.reconnects += 1;
        }
        entry.status = status;
    }

    /// Record that a frame was applied.
    pub fn record_update(&self, kind: StreamKind) {
        let mut streams = self.streams.write();
        let entry = streams.entry(kind).or_insert_with(Entry::new);
        entry.last_update = Some(Instant::now());
        entry.last_update_at = Some(Utc::now());
    }

    pub fn status(&self, kind: StreamKind) -> Option<StreamStatus> {
        self.streams.read().get(&kind).map(|e| e.status)
    }

    pub fn reconnects(&self, kind: StreamKind) -> u64 {
        self.streams.read().get(&kind).map_or(0, |e| e.reconnects)
    }

    pub fn since_last_update(&self, kind: StreamKind) -> Option<Duration> {
        self.streams
            .read()
            .get(&kind)
            .and_then(|e| e.last_update)
            .map(|t| t.elapsed())
    }

    /// Streams in `required` that are not `Live` (unknown counts as not live).
    pub fn not_live(&self, required: &[StreamKind]) -> Vec<StreamKind> {
        let streams = self.streams.read();
        required
            .iter()
            .copied()
            .filter(|k| streams.get(k).map(|e| e.status) != Some(StreamStatus::Live))
            .collect()
    }

    pub fn all_live(&self, required: &[StreamKind]) -> bool {
        self.not_live(required).is_empty()
    }

    pub fn snapshot(&self) -> Vec<StreamHealthView> {
        self.streams
            .read()
            .iter()
            .map(|(kind, e)| StreamHealthView {
                stream: *kind,
                status: e.status,
                reconnects: e.reconnects,
                last_update: e.last_update_at,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_streams_start_connecting() {
        let health = StreamHealth::with_streams(&[StreamKind::Orders, StreamKind::Accounts]);
        assert_eq!(health.status(StreamKind::Orders), Some(StreamStatus::Connecting));
        assert_eq!(health.status(StreamKind::Positions), None);
        assert!(!health.all_live(&[StreamKind::Orders]));
    }

    #[test]
    fn test_all_live_requires_every_stream() {
        let health = StreamHealth::with_streams(&StreamKind::ALL);
        for kind in StreamKind::ALL {
            health.set_status(kind, StreamStatus::Live);
        }
        assert!(health.all_live(&StreamKind::ALL));

        health.set_status(StreamKind::Positions, StreamStatus::Reconnecting);
        assert_eq!(health.not_live(&StreamKind::ALL), vec![StreamKind::Positions]);
        // Unregistered stream is never live
        assert!(!StreamHealth::new().all_live(&[StreamKind::Orders]));
    }

    #[test]
    fn test_reconnects_counted_once_per_transition() {
        let health = StreamHealth::new();
        health.set_status(StreamKind::Orders, StreamStatus::Live);
        health.set_status(StreamKind::Orders, StreamStatus::Reconnecting);
        health.set_status(StreamKind::Orders, StreamStatus::Reconnecting);
        health.set_status(StreamKind::Orders, StreamStatus::Connecting);
        health.set_status(StreamKind::Orders, StreamStatus::Reconnecting);
        assert_eq!(health.reconnects(StreamKind::Orders), 2);
    }

    #[test]
    fn test_connection_state_mapping() {
        assert_eq!(StreamStatus::from(ConnectionState::Connected), StreamStatus::Live);
        assert_eq!(
            StreamStatus::from(ConnectionState::Reconnecting),
            StreamStatus::Reconnecting
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let health = StreamHealth::with_streams(&[StreamKind::MarketData]);
        health.record_update(StreamKind::MarketData);
        let json = serde_json::to_value(health.snapshot()).unwrap();
        assert_eq!(json[0]["stream"], "market_data");
        assert_eq!(json[0]["status"], "connecting");
        assert!(json[0]["last_update"].is_string());
        assert!(health.since_last_update(StreamKind::MarketData).is_some());
    }
}
