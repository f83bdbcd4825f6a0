//! # Shard-Chain Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks per subsystem
//! │   ├── sc_01_sampler.rs
//! │   └── sc_03_shard_chain.rs
//! │
//! └── integration/      # Cross-subsystem flows through ShardingNode
//!     ├── harness.rs
//!     ├── e2e_sharding.rs
//!     ├── receipts_flow.rs
//!     └── orphan_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By category
//! cargo test -p sc-tests integration::
//!
//! # Benchmarks
//! cargo bench -p sc-tests
//! ```

pub mod benchmarks;
pub mod integration;
