//! # Shard-Chain Benchmarks
//!
//! Criterion benchmarks for the hot paths: collator sampling and
//! collation scoring/acceptance.

pub mod sc_01_sampler;
pub mod sc_03_shard_chain;
