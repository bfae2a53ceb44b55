use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use swaplist_eth_client::{EthClientError, EthClientResult, EthNode};
use swaplist_primitives::{
    Address, BlockHash, LogEntry, NodeBlock, NodeTransaction, TransactionRecord, TxHash,
};

pub(crate) fn contract() -> Address {
    Address::repeat_byte(0xc2)
}

pub(crate) fn sender(id: u8) -> Address {
    Address::repeat_byte(id)
}

pub(crate) fn block_hash(number: u64) -> BlockHash {
    BlockHash::left_padding_from(&number.to_be_bytes())
}

fn tx_hash(seq: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xee;
    bytes[24..].copy_from_slice(&seq.to_be_bytes());
    TxHash::from(bytes)
}

/// Shared view into what a [`FakeNode`] was asked, usable after the node has
/// been moved into a client.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeNodeProbe {
    queries: Arc<Mutex<Vec<(u64, u64)>>>,
    block_fetches: Arc<AtomicUsize>,
}

impl FakeNodeProbe {
    /// Log filter windows in the order they were queried.
    pub(crate) fn queries(&self) -> Vec<(u64, u64)> {
        self.queries.lock().clone()
    }

    pub(crate) fn block_fetches(&self) -> usize {
        self.block_fetches.load(Ordering::SeqCst)
    }
}

/// In-memory chain with one contract emitting a log per transaction.
#[derive(Debug, Default)]
pub(crate) struct FakeNode {
    blocks: BTreeMap<u64, NodeBlock>,
    txs: HashMap<TxHash, NodeTransaction>,
    logs: Vec<LogEntry>,
    next_tx: u64,
    fail_logs_from: Option<u64>,
    log_delay: Option<Duration>,
    tx_delay: Option<Duration>,
    probe: FakeNodeProbe,
}

impl FakeNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn probe(&self) -> FakeNodeProbe {
        self.probe.clone()
    }

    /// Makes every log query whose window starts at or after `block` fail.
    pub(crate) fn fail_logs_from(&mut self, block: u64) {
        self.fail_logs_from = Some(block);
    }

    pub(crate) fn set_log_delay(&mut self, delay: Duration) {
        self.log_delay = Some(delay);
    }

    /// Slows down every transaction lookup by `delay`.
    pub(crate) fn set_tx_delay(&mut self, delay: Duration) {
        self.tx_delay = Some(delay);
    }

    /// Adds a mined transaction from `sender(sender_id)` and the log it emitted.
    pub(crate) fn add_mined_tx(&mut self, number: u64, timestamp: u64, sender_id: u8) -> LogEntry {
        let hash = self.next_tx_hash();
        let block = self.block_mut(number, timestamp);
        let index = block.transactions.len() as u64;
        block.transactions.push(hash);

        let tx = NodeTransaction::new_mined(
            hash,
            sender(sender_id),
            block_hash(number),
            number,
            index,
        );
        self.txs.insert(hash, tx);
        self.push_log(number, hash)
    }

    /// Adds a log whose transaction the node still reports as pending.
    pub(crate) fn add_pending_tx(&mut self, number: u64, timestamp: u64, sender_id: u8) -> LogEntry {
        let hash = self.next_tx_hash();
        self.block_mut(number, timestamp);
        self.txs
            .insert(hash, NodeTransaction::new_pending(hash, sender(sender_id)));
        self.push_log(number, hash)
    }

    /// Adds a log whose transaction claims inclusion in a block that does not
    /// list it.
    pub(crate) fn add_orphan_tx(&mut self, number: u64, timestamp: u64, sender_id: u8) -> LogEntry {
        let hash = self.next_tx_hash();
        self.block_mut(number, timestamp);
        let tx = NodeTransaction::new_mined(hash, sender(sender_id), block_hash(number), number, 0);
        self.txs.insert(hash, tx);
        self.push_log(number, hash)
    }

    /// Records the node is expected to yield for `[from, to]`, in order.
    pub(crate) fn expected_records(&self, from: u64, to: u64) -> Vec<TransactionRecord> {
        let mut logs: Vec<_> = self
            .logs
            .iter()
            .filter(|l| (from..=to).contains(&l.block_number))
            .collect();
        logs.sort_by_key(|l| (l.block_number, l.log_index));

        logs.into_iter()
            .filter_map(|l| {
                let tx = &self.txs[&l.tx_hash];
                let block = &self.blocks[&l.block_number];
                (!tx.is_pending()).then(|| TransactionRecord::new(tx.from, block.timestamp))
            })
            .collect()
    }

    fn next_tx_hash(&mut self) -> TxHash {
        self.next_tx += 1;
        tx_hash(self.next_tx)
    }

    fn block_mut(&mut self, number: u64, timestamp: u64) -> &mut NodeBlock {
        self.blocks.entry(number).or_insert_with(|| NodeBlock {
            hash: block_hash(number),
            number,
            timestamp,
            transactions: Vec::new(),
        })
    }

    fn push_log(&mut self, number: u64, tx_hash: TxHash) -> LogEntry {
        let log_index = self
            .logs
            .iter()
            .filter(|l| l.block_number == number)
            .count() as u64;
        let log = LogEntry {
            address: contract(),
            block_number: number,
            block_hash: block_hash(number),
            tx_hash,
            log_index,
        };
        self.logs.push(log.clone());
        log
    }
}

#[async_trait]
impl EthNode for FakeNode {
    async fn filter_logs(
        &self,
        addresses: &[Address],
        from_block: u64,
        to_block: u64,
    ) -> EthClientResult<Vec<LogEntry>> {
        if let Some(delay) = self.log_delay {
            tokio::time::sleep(delay).await;
        }
        self.probe.queries.lock().push((from_block, to_block));

        if self.fail_logs_from.is_some_and(|b| from_block >= b) {
            return Err(EthClientError::rpc("query returned more than 10000 results"));
        }

        let mut logs: Vec<_> = self
            .logs
            .iter()
            .filter(|l| addresses.contains(&l.address))
            .filter(|l| (from_block..=to_block).contains(&l.block_number))
            .cloned()
            .collect();
        logs.sort_by_key(|l| (l.block_number, l.log_index));
        Ok(logs)
    }

    async fn block_by_hash(&self, hash: BlockHash) -> EthClientResult<NodeBlock> {
        self.probe.block_fetches.fetch_add(1, Ordering::SeqCst);
        self.blocks
            .values()
            .find(|b| b.hash == hash)
            .cloned()
            .ok_or_else(|| EthClientError::not_found(format!("block {hash}")))
    }

    async fn transaction_by_hash(&self, hash: TxHash) -> EthClientResult<(NodeTransaction, bool)> {
        if let Some(delay) = self.tx_delay {
            tokio::time::sleep(delay).await;
        }
        let tx = self
            .txs
            .get(&hash)
            .cloned()
            .ok_or_else(|| EthClientError::not_found(format!("transaction {hash}")))?;
        let pending = tx.is_pending();
        Ok((tx, pending))
    }

    async fn transaction_sender(
        &self,
        tx: &NodeTransaction,
        block_hash: BlockHash,
        _index: u64,
    ) -> EthClientResult<Address> {
        if tx.block_hash == Some(block_hash) {
            Ok(tx.from)
        } else {
            Err(EthClientError::not_found(format!(
                "transaction {} in block {block_hash}",
                tx.hash
            )))
        }
    }
}
