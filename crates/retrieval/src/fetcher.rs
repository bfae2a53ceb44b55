use std::num::NonZeroU64;

use swaplist_eth_client::{EthNode, RateLimitedClient};
use swaplist_primitives::{Address, BlockRange, LogEntry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, RetrievalError};

/// Queries `range` one chunk at a time and forwards every log in order.
///
/// Returns the number of logs forwarded. Stops early without error if the
/// receiving side goes away.
pub(crate) async fn fetch_logs<N: EthNode>(
    client: &RateLimitedClient<N>,
    address: Address,
    range: BlockRange,
    limit: NonZeroU64,
    logs_tx: mpsc::Sender<LogEntry>,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut forwarded = 0;

    for window in range.chunks(limit) {
        debug!(from = window.from(), to = window.to(), "fetching logs");

        let logs = client
            .filter_logs(&[address], window.from(), window.to(), cancel)
            .await
            .map_err(|e| RetrievalError::log_fetch(window, e))?;

        if !logs.is_empty() {
            debug!(count = logs.len(), %window, "received logs");
        }

        for log in logs {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetrievalError::Cancelled),
                res = logs_tx.send(log) => {
                    if res.is_err() {
                        debug!("log receiver dropped, stopping fetch");
                        return Ok(forwarded);
                    }
                }
            }
            forwarded += 1;
        }
    }

    Ok(forwarded)
}
