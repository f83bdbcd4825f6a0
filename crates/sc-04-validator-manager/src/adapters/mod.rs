//! # Adapters Module
//!
//! In-memory main chain and event bus.

pub mod event_bus;
pub mod main_chain;

pub use event_bus::InMemoryEventBus;
pub use main_chain::InMemoryMainChain;
