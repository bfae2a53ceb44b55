use std::{fmt, future::Future, num::NonZeroU32};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use swaplist_primitives::{Address, BlockHash, LogEntry, NodeBlock, NodeTransaction, TxHash};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    error::{EthClientError, EthClientResult},
    node::{AlloyNode, EthNode},
};

/// Serialised, optionally throttled access to an [`EthNode`].
///
/// Every call waits for a rate limiter permit, then runs against the node
/// while holding the node lock. Both waits race against the caller's
/// cancellation token.
pub struct RateLimitedClient<N> {
    node: Mutex<N>,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl<N> fmt::Debug for RateLimitedClient<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitedClient")
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl RateLimitedClient<AlloyNode> {
    /// Connects to `endpoint`. `None` disables throttling.
    pub async fn connect(
        endpoint: &str,
        max_requests_per_second: Option<NonZeroU32>,
    ) -> EthClientResult<Self> {
        let node = AlloyNode::connect(endpoint).await?;
        Ok(Self::new(node, max_requests_per_second))
    }
}

impl<N: EthNode> RateLimitedClient<N> {
    /// Wraps `node`, allowing at most `max_requests_per_second` calls per
    /// second with a burst of the same size.
    pub fn new(node: N, max_requests_per_second: Option<NonZeroU32>) -> Self {
        let limiter =
            max_requests_per_second.map(|rps| RateLimiter::direct(Quota::per_second(rps)));
        Self {
            node: Mutex::new(node),
            limiter,
        }
    }

    pub async fn filter_logs(
        &self,
        addresses: &[Address],
        from_block: u64,
        to_block: u64,
        cancel: &CancellationToken,
    ) -> EthClientResult<Vec<LogEntry>> {
        self.guarded(cancel, async {
            let node = self.node.lock().await;
            node.filter_logs(addresses, from_block, to_block).await
        })
        .await
    }

    pub async fn block_by_hash(
        &self,
        hash: BlockHash,
        cancel: &CancellationToken,
    ) -> EthClientResult<NodeBlock> {
        self.guarded(cancel, async {
            let node = self.node.lock().await;
            node.block_by_hash(hash).await
        })
        .await
    }

    pub async fn transaction_by_hash(
        &self,
        hash: TxHash,
        cancel: &CancellationToken,
    ) -> EthClientResult<(NodeTransaction, bool)> {
        self.guarded(cancel, async {
            let node = self.node.lock().await;
            node.transaction_by_hash(hash).await
        })
        .await
    }

    pub async fn transaction_sender(
        &self,
        tx: &NodeTransaction,
        block_hash: BlockHash,
        index: u64,
        cancel: &CancellationToken,
    ) -> EthClientResult<Address> {
        self.guarded(cancel, async {
            let node = self.node.lock().await;
            node.transaction_sender(tx, block_hash, index).await
        })
        .await
    }

    async fn guarded<T>(
        &self,
        cancel: &CancellationToken,
        call: impl Future<Output = EthClientResult<T>>,
    ) -> EthClientResult<T> {
        self.acquire_permit(cancel).await?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EthClientError::Cancelled),
            res = call => res,
        }
    }

    async fn acquire_permit(&self, cancel: &CancellationToken) -> EthClientResult<()> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EthClientError::RateLimitCancelled),
            _ = limiter.until_ready() => {
                trace!("rate limiter permit acquired");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };

    use async_trait::async_trait;
    use mockall::predicate::eq;

    use super::*;
    use crate::node::MockEthNode;

    fn rps(n: u32) -> Option<NonZeroU32> {
        NonZeroU32::new(n)
    }

    fn sample_block(byte: u8) -> NodeBlock {
        NodeBlock {
            hash: BlockHash::repeat_byte(byte),
            number: 42,
            timestamp: 1_700_000_000,
            transactions: vec![TxHash::repeat_byte(0xaa)],
        }
    }

    #[tokio::test]
    async fn test_delegates_to_node() {
        let hash = BlockHash::repeat_byte(1);
        let mut node = MockEthNode::new();
        node.expect_block_by_hash()
            .with(eq(hash))
            .times(1)
            .returning(|h| {
                let mut block = sample_block(1);
                block.hash = h;
                Ok(block)
            });

        let client = RateLimitedClient::new(node, None);
        let block = client
            .block_by_hash(hash, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(block.hash, hash);
        assert_eq!(block.number, 42);
    }

    #[tokio::test]
    async fn test_filter_logs_forwards_range() {
        let addr = Address::repeat_byte(7);
        let mut node = MockEthNode::new();
        node.expect_filter_logs()
            .withf(move |addrs, from, to| {
                addrs.len() == 1 && addrs[0] == addr && *from == 100 && *to == 104
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![]));

        let client = RateLimitedClient::new(node, rps(100));
        let logs = client
            .filter_logs(&[addr], 100, 104, &CancellationToken::new())
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_node_errors_pass_through() {
        let mut node = MockEthNode::new();
        node.expect_transaction_by_hash()
            .times(1)
            .returning(|_| Err(EthClientError::rpc("boom")));

        let client = RateLimitedClient::new(node, None);
        let err = client
            .transaction_by_hash(TxHash::ZERO, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, EthClientError::Rpc(ref msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn test_cancelled_token_rejects_before_rate_limiter() {
        let mut node = MockEthNode::new();
        node.expect_block_by_hash().never();

        let client = RateLimitedClient::new(node, rps(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .block_by_hash(BlockHash::ZERO, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EthClientError::RateLimitCancelled));
    }

    #[tokio::test]
    async fn test_cancelled_token_without_limiter_skips_node() {
        let mut node = MockEthNode::new();
        node.expect_block_by_hash().never();

        let client = RateLimitedClient::new(node, None);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .block_by_hash(BlockHash::ZERO, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EthClientError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_permit() {
        let mut node = MockEthNode::new();
        node.expect_block_by_hash()
            .times(1)
            .returning(|_| Ok(sample_block(1)));

        let client = Arc::new(RateLimitedClient::new(node, rps(1)));
        let cancel = CancellationToken::new();

        // Uses up the only permit for the next second.
        client.block_by_hash(BlockHash::ZERO, &cancel).await.unwrap();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = client
            .block_by_hash(BlockHash::ZERO, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EthClientError::RateLimitCancelled));
    }

    #[tokio::test]
    async fn test_calls_are_throttled() {
        let mut node = MockEthNode::new();
        node.expect_block_by_hash()
            .times(3)
            .returning(|_| Ok(sample_block(1)));

        let client = RateLimitedClient::new(node, rps(2));
        let cancel = CancellationToken::new();

        let start = Instant::now();
        for _ in 0..3 {
            client.block_by_hash(BlockHash::ZERO, &cancel).await.unwrap();
        }

        // Burst of two, the third call waits for a replenished permit.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    /// Node whose block lookups never finish in time.
    #[derive(Debug)]
    struct StalledNode;

    #[async_trait]
    impl EthNode for StalledNode {
        async fn filter_logs(
            &self,
            _addresses: &[Address],
            _from_block: u64,
            _to_block: u64,
        ) -> EthClientResult<Vec<LogEntry>> {
            Ok(vec![])
        }

        async fn block_by_hash(&self, _hash: BlockHash) -> EthClientResult<NodeBlock> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(sample_block(1))
        }

        async fn transaction_by_hash(
            &self,
            hash: TxHash,
        ) -> EthClientResult<(NodeTransaction, bool)> {
            Ok((NodeTransaction::new_pending(hash, Address::ZERO), true))
        }

        async fn transaction_sender(
            &self,
            tx: &NodeTransaction,
            _block_hash: BlockHash,
            _index: u64,
        ) -> EthClientResult<Address> {
            Ok(tx.from)
        }
    }

    #[tokio::test]
    async fn test_cancel_during_node_call() {
        let client = RateLimitedClient::new(StalledNode, None);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = client
            .block_by_hash(BlockHash::ZERO, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, EthClientError::Cancelled));
        assert!(err.is_cancelled());
    }
}
