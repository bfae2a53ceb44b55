use alloy::{
    network::TransactionResponse,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{Block, Filter, Log, Transaction},
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use swaplist_primitives::{Address, BlockHash, LogEntry, NodeBlock, NodeTransaction, TxHash};
use tracing::debug;

use crate::error::{EthClientError, EthClientResult};

/// Node operations needed to turn event logs into transaction records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EthNode: Send + Sync {
    /// Returns logs emitted by any of `addresses` in the inclusive block range.
    async fn filter_logs(
        &self,
        addresses: &[Address],
        from_block: u64,
        to_block: u64,
    ) -> EthClientResult<Vec<LogEntry>>;

    async fn block_by_hash(&self, hash: BlockHash) -> EthClientResult<NodeBlock>;

    /// Returns the transaction and whether it is still pending.
    async fn transaction_by_hash(&self, hash: TxHash)
        -> EthClientResult<(NodeTransaction, bool)>;

    /// Recovers the sender of `tx`, included in `block_hash` at `index`.
    async fn transaction_sender(
        &self,
        tx: &NodeTransaction,
        block_hash: BlockHash,
        index: u64,
    ) -> EthClientResult<Address>;
}

/// [`EthNode`] backed by an alloy provider, over HTTP or WebSocket.
#[derive(Debug, Clone)]
pub struct AlloyNode {
    provider: DynProvider,
}

impl AlloyNode {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Connects to `endpoint`, picking the transport from the URL scheme.
    pub async fn connect(endpoint: &str) -> EthClientResult<Self> {
        let provider = ProviderBuilder::new()
            .connect(endpoint)
            .await
            .map_err(|e| EthClientError::connection(endpoint, e))?;
        debug!(%endpoint, "connected to node");
        Ok(Self::new(provider.erased()))
    }
}

#[async_trait]
impl EthNode for AlloyNode {
    async fn filter_logs(
        &self,
        addresses: &[Address],
        from_block: u64,
        to_block: u64,
    ) -> EthClientResult<Vec<LogEntry>> {
        let filter = Filter::new()
            .address(addresses.to_vec())
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| EthClientError::rpc(e.to_string()))?;

        logs.into_iter().map(log_entry_from_rpc).collect()
    }

    async fn block_by_hash(&self, hash: BlockHash) -> EthClientResult<NodeBlock> {
        let block = self
            .provider
            .get_block_by_hash(hash)
            .await
            .map_err(|e| EthClientError::rpc(e.to_string()))?
            .ok_or_else(|| EthClientError::not_found(format!("block {hash}")))?;

        Ok(node_block_from_rpc(block))
    }

    async fn transaction_by_hash(
        &self,
        hash: TxHash,
    ) -> EthClientResult<(NodeTransaction, bool)> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| EthClientError::rpc(e.to_string()))?
            .ok_or_else(|| EthClientError::not_found(format!("transaction {hash}")))?;

        let tx = node_transaction_from_rpc(&tx);
        let pending = tx.is_pending();
        Ok((tx, pending))
    }

    async fn transaction_sender(
        &self,
        tx: &NodeTransaction,
        block_hash: BlockHash,
        index: u64,
    ) -> EthClientResult<Address> {
        // The sender was recovered by the node when the transaction was looked
        // up, reuse it when it refers to the same inclusion.
        if tx.block_hash == Some(block_hash) && tx.transaction_index == Some(index) {
            return Ok(tx.from);
        }

        let rpc_index = usize::try_from(index)
            .map_err(|_| EthClientError::malformed(format!("transaction index {index}")))?;
        let found = self
            .provider
            .get_transaction_by_block_hash_and_index(block_hash, rpc_index)
            .await
            .map_err(|e| EthClientError::rpc(e.to_string()))?
            .ok_or_else(|| {
                EthClientError::not_found(format!("transaction {index} in block {block_hash}"))
            })?;

        if found.tx_hash() != tx.hash {
            return Err(EthClientError::malformed(format!(
                "transaction {index} in block {block_hash} is {}, expected {}",
                found.tx_hash(),
                tx.hash
            )));
        }

        Ok(found.from())
    }
}

fn log_entry_from_rpc(log: Log) -> EthClientResult<LogEntry> {
    let missing = |field: &str| EthClientError::malformed(format!("log without {field}"));

    Ok(LogEntry {
        address: log.inner.address,
        block_number: log.block_number.ok_or_else(|| missing("block number"))?,
        block_hash: log.block_hash.ok_or_else(|| missing("block hash"))?,
        tx_hash: log.transaction_hash.ok_or_else(|| missing("transaction hash"))?,
        log_index: log.log_index.ok_or_else(|| missing("log index"))?,
    })
}

fn node_block_from_rpc(block: Block) -> NodeBlock {
    NodeBlock {
        hash: block.header.hash,
        number: block.header.number,
        timestamp: block.header.timestamp,
        transactions: block.transactions.hashes().collect(),
    }
}

fn node_transaction_from_rpc(tx: &Transaction) -> NodeTransaction {
    NodeTransaction {
        hash: tx.tx_hash(),
        from: tx.from(),
        block_hash: tx.block_hash,
        block_number: tx.block_number,
        transaction_index: tx.transaction_index,
    }
}
