//! Shared live state for the market maker.
//!
//! - [`StateStore`]: exchange-derived entities behind one lock
//! - [`ReferencePriceFeed`]: latest external bid/ask
//! - [`StreamHealth`]: per-subscription liveness
//! - [`TickerHandler`]: reference price ingestion over `vmm-ws`

pub mod error;
pub mod event;
pub mod health;
pub mod reference_price;
pub mod store;
pub mod ticker;

pub use error::{FeedError, FeedResult};
pub use event::StreamEvent;
pub use health::{StreamHealth, StreamHealthView, StreamKind, StreamStatus};
pub use reference_price::{ReferencePrice, ReferencePriceFeed};
pub use store::StateStore;
pub use ticker::{parse_ticker, subscribe_frame, TickerEvent, TickerHandler};
