//! Data types shared by the swaplist crates: block ranges and their chunk
//! windows, node-reported records and the transaction records we emit.

mod node;
mod range;
mod record;

pub use alloy_primitives::{Address, BlockHash, TxHash};
pub use node::{LogEntry, NodeBlock, NodeTransaction};
pub use range::{BlockRange, ChunkWindows, EndBlock, UNBOUNDED_END_BLOCK};
pub use record::TransactionRecord;
