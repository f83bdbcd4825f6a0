//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::{Address, ShardId, Wei};

/// Parameters of a `tx_to_shard` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRequest {
    /// Caller on the sending chain.
    pub sender: Address,
    /// Destination shard.
    pub shard_id: ShardId,
    /// Recipient on the destination shard.
    pub to: Address,
    /// Gas for the consuming transaction.
    pub startgas: u64,
    /// Gas price for the consuming transaction.
    pub gasprice: u64,
    /// Call data delivered to `to`.
    pub data: Vec<u8>,
    /// Escrowed value.
    pub value: Wei,
}

/// An escrowed cross-shard call intent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Destination shard.
    pub shard_id: ShardId,
    /// Gas for the consuming transaction.
    pub startgas: u64,
    /// Gas price for the consuming transaction.
    pub gasprice: u64,
    /// Recipient on the destination shard.
    pub to: Address,
    /// Escrowed value.
    pub value: Wei,
    /// Call data delivered to `to`.
    pub data: Vec<u8>,
    /// Caller on the sending chain.
    pub sender: Address,
    /// Flips to `true` exactly once.
    pub consumed: bool,
}

impl From<ReceiptRequest> for Receipt {
    fn from(request: ReceiptRequest) -> Self {
        Self {
            shard_id: request.shard_id,
            startgas: request.startgas,
            gasprice: request.gasprice,
            to: request.to,
            value: request.value,
            data: request.data,
            sender: request.sender,
            consumed: false,
        }
    }
}

/// Who is calling into a shard's used-receipt store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOrigin {
    /// Code executing inside the given shard's own state.
    ShardExecution(ShardId),
    /// Any other caller (an account or contract on another chain).
    External(Address),
}
