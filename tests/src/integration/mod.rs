//! # Integration Flows
//!
//! End-to-end scenarios that cross the registry, receipt, shard-chain and
//! manager subsystems.

#[cfg(test)]
mod harness;

pub mod e2e_sharding;
pub mod orphan_flow;
pub mod receipts_flow;
