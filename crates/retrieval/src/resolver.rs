use std::sync::Arc;

use swaplist_block_cache::BlockCache;
use swaplist_eth_client::{EthNode, RateLimitedClient};
use swaplist_primitives::{LogEntry, NodeBlock, TransactionRecord};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{Result, RetrievalError};

/// Turns one log into the record of the transaction that emitted it.
///
/// Returns `Ok(None)` for transactions that are still pending.
pub(crate) async fn resolve_log<N: EthNode>(
    client: &RateLimitedClient<N>,
    cache: &BlockCache,
    log: &LogEntry,
    cancel: &CancellationToken,
) -> Result<Option<TransactionRecord>> {
    let (tx, pending) = client
        .transaction_by_hash(log.tx_hash, cancel)
        .await
        .map_err(|e| RetrievalError::resolve(log.tx_hash, e))?;

    if pending {
        debug!(tx_hash = %log.tx_hash, "skipping pending transaction");
        return Ok(None);
    }

    let block = load_block(client, cache, log, cancel).await?;

    let index = block.transaction_index(&tx.hash).ok_or(
        RetrievalError::TransactionNotFoundInBlock {
            tx_hash: tx.hash,
            block_hash: block.hash,
        },
    )?;

    let sender = client
        .transaction_sender(&tx, block.hash, index, cancel)
        .await
        .map_err(|e| RetrievalError::resolve(log.tx_hash, e))?;

    Ok(Some(TransactionRecord::new(sender, block.time())))
}

async fn load_block<N: EthNode>(
    client: &RateLimitedClient<N>,
    cache: &BlockCache,
    log: &LogEntry,
    cancel: &CancellationToken,
) -> Result<Arc<NodeBlock>> {
    if let Some(block) = cache.get(&log.block_hash) {
        trace!(block = log.block_number, "block cache hit");
        return Ok(block);
    }

    let block = client
        .block_by_hash(log.block_hash, cancel)
        .await
        .map_err(|e| RetrievalError::resolve(log.tx_hash, e))?;
    let block = Arc::new(block);
    cache.set(block.clone());
    Ok(block)
}
