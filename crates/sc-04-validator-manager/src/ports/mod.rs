//! # Ports Layer
//!
//! - `inbound`: `ShardingApi`, the async surface of a sharding node
//! - `outbound`: main-chain view and event sink

pub mod inbound;
pub mod outbound;

pub use inbound::ShardingApi;
pub use outbound::{EventBus, MainChainView};
