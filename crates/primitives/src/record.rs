use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// A resolved transaction: who sent it and when its block was produced.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Sender address recovered from the transaction.
    pub sender: Address,

    /// Unix timestamp of the including block, in seconds.
    pub timestamp: u64,
}

impl TransactionRecord {
    pub fn new(sender: Address, timestamp: u64) -> Self {
        Self { sender, timestamp }
    }

    /// Renders the record as one output line, `<checksummed sender>:<timestamp>\n`.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sender, self.timestamp)
    }
}
