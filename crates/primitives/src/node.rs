//! Node-reported data, reduced to the fields the retrieval pipeline reads.

use alloy_primitives::{Address, BlockHash, TxHash};
use serde::{Deserialize, Serialize};

/// One event log returned by a log filter query.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Contract that emitted the log.
    pub address: Address,
    pub block_number: u64,
    pub block_hash: BlockHash,
    pub tx_hash: TxHash,
    pub log_index: u64,
}

/// Block header data plus the ordered hashes of its transactions.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeBlock {
    pub hash: BlockHash,
    pub number: u64,
    pub timestamp: u64,
    pub transactions: Vec<TxHash>,
}

impl NodeBlock {
    /// Block timestamp, seconds since the Unix epoch.
    pub fn time(&self) -> u64 {
        self.timestamp
    }

    /// Position of `tx` within the block, if it is included.
    pub fn transaction_index(&self, tx: &TxHash) -> Option<u64> {
        self.transactions
            .iter()
            .position(|h| h == tx)
            .map(|i| i as u64)
    }
}

/// A transaction as looked up by hash.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeTransaction {
    pub hash: TxHash,
    pub from: Address,
    pub block_hash: Option<BlockHash>,
    pub block_number: Option<u64>,
    pub transaction_index: Option<u64>,
}

impl NodeTransaction {
    pub fn new_pending(hash: TxHash, from: Address) -> Self {
        Self {
            hash,
            from,
            block_hash: None,
            block_number: None,
            transaction_index: None,
        }
    }

    pub fn new_mined(
        hash: TxHash,
        from: Address,
        block_hash: BlockHash,
        block_number: u64,
        transaction_index: u64,
    ) -> Self {
        Self {
            hash,
            from,
            block_hash: Some(block_hash),
            block_number: Some(block_number),
            transaction_index: Some(transaction_index),
        }
    }

    /// A transaction without an including block has not been mined yet.
    pub fn is_pending(&self) -> bool {
        self.block_hash.is_none()
    }
}
