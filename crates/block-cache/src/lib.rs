//! Single-slot cache for the most recently fetched block.
//!
//! Logs arrive ordered by block, so consecutive logs usually point at the same
//! block. Keeping only the last one is enough to avoid refetching it for every
//! log in that block.

use std::sync::Arc;

use parking_lot::Mutex;
use swaplist_primitives::{BlockHash, NodeBlock};

/// Holds at most one block, keyed by its hash.
#[derive(Debug, Default)]
pub struct BlockCache {
    slot: Mutex<Option<Arc<NodeBlock>>>,
}

impl BlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was cached with `block`.
    pub fn set(&self, block: Arc<NodeBlock>) {
        *self.slot.lock() = Some(block);
    }

    /// Returns the cached block if its hash is `hash`.
    pub fn get(&self, hash: &BlockHash) -> Option<Arc<NodeBlock>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|block| &block.hash == hash)
            .cloned()
    }
}
