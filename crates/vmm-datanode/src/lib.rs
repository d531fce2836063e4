//! Data-node integration.
//!
//! - [`DataNodeClient`]: REST bootstrap loads
//! - [`wire`]: JSON wire format and stream frame decoding
//! - [`ingest`]: bootstrap into the store, then one reconnecting
//!   subscription per topic

pub mod client;
pub mod error;
pub mod ingest;
pub mod wire;

pub use client::DataNodeClient;
pub use error::{DataNodeError, DataNodeResult};
pub use ingest::{
    bootstrap, run_stream, topic_url, ws_base_from_rest, DataNodeStream, Scope, DATANODE_STREAMS,
};
pub use wire::{decode_frame, StreamFrame};
