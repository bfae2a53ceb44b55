use std::{future, num::NonZeroU64, sync::Arc};

use swaplist_block_cache::BlockCache;
use swaplist_eth_client::{EthNode, RateLimitedClient};
use swaplist_primitives::{LogEntry, TransactionRecord};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, RetrievalError},
    fetcher::fetch_logs,
    request::{RetrievalRequest, ValidatedRequest},
    resolver::resolve_log,
};

/// Default capacity of the record channel handed to the caller.
pub const DEFAULT_RESULT_BUFFER: usize = 10;
/// Default capacity of the internal log channel between the two stages.
pub const DEFAULT_LOG_BUFFER: usize = 64;

/// Receiving side of one retrieval.
///
/// `records` yields transaction records in block order. `errors` yields at
/// most one error. Both close once the retrieval has finished.
#[derive(Debug)]
pub struct RetrievalHandle {
    pub records: mpsc::Receiver<TransactionRecord>,
    pub errors: mpsc::Receiver<RetrievalError>,
}

impl RetrievalHandle {
    /// Drains the handle, returning every record and the terminal error if any.
    pub async fn collect(mut self) -> (Vec<TransactionRecord>, Option<RetrievalError>) {
        let mut records = Vec::new();
        while let Some(record) = self.records.recv().await {
            records.push(record);
        }
        let error = self.errors.recv().await;
        (records, error)
    }
}

/// Streams transaction records for contract logs over block ranges.
///
/// Owns the node client and the block cache; requests are served one after
/// another, each by its own fetch and resolve task.
#[derive(Debug)]
pub struct Retriever<N> {
    client: Arc<RateLimitedClient<N>>,
    cache: Arc<BlockCache>,
    block_range_limit: NonZeroU64,
    log_buffer: usize,
    result_buffer: usize,
}

impl<N: EthNode + 'static> Retriever<N> {
    pub fn new(client: Arc<RateLimitedClient<N>>, block_range_limit: NonZeroU64) -> Self {
        Self {
            client,
            cache: Arc::new(BlockCache::new()),
            block_range_limit,
            log_buffer: DEFAULT_LOG_BUFFER,
            result_buffer: DEFAULT_RESULT_BUFFER,
        }
    }

    /// Sets the capacity of the internal log channel.
    pub fn with_log_buffer(mut self, v: usize) -> Self {
        self.log_buffer = v.max(1);
        self
    }

    /// Sets the capacity of the record channel returned to callers.
    pub fn with_result_buffer(mut self, v: usize) -> Self {
        self.result_buffer = v.max(1);
        self
    }

    /// Starts a retrieval for `request`.
    ///
    /// Invalid requests are answered with a single validation error without
    /// touching the node. Cancelling `cancel` stops both stages and reports
    /// [`RetrievalError::Cancelled`].
    pub fn retrieve(
        &self,
        request: &RetrievalRequest,
        cancel: &CancellationToken,
    ) -> RetrievalHandle {
        let (records_tx, records_rx) = mpsc::channel(self.result_buffer);
        let (errors_tx, errors_rx) = mpsc::channel(1);
        let handle = RetrievalHandle {
            records: records_rx,
            errors: errors_rx,
        };

        let validated = match request.validate() {
            Ok(v) => v,
            Err(err) => {
                warn!(%err, "rejecting retrieval request");
                // Fresh channel with room for one, cannot be full.
                let _ = errors_tx.try_send(err.into());
                return handle;
            }
        };

        info!(
            address = %validated.address,
            from = validated.range.from(),
            to = validated.range.to(),
            blocks = validated.range.block_count(),
            chunk = self.block_range_limit.get(),
            "starting retrieval"
        );

        let cancel = cancel.child_token();
        let fetch_cancel = cancel.child_token();
        let (logs_tx, logs_rx) = mpsc::channel(self.log_buffer);

        let fetch = tokio::spawn(fetch_task(
            self.client.clone(),
            validated,
            self.block_range_limit,
            logs_tx,
            fetch_cancel.clone(),
        ));

        let ctx = ResolveCtx {
            client: self.client.clone(),
            cache: self.cache.clone(),
            cancel,
            fetch_cancel,
        };
        tokio::spawn(resolve_task(ctx, logs_rx, fetch, records_tx, errors_tx));

        handle
    }
}

async fn fetch_task<N: EthNode>(
    client: Arc<RateLimitedClient<N>>,
    request: ValidatedRequest,
    limit: NonZeroU64,
    logs_tx: mpsc::Sender<LogEntry>,
    cancel: CancellationToken,
) -> Result<u64> {
    fetch_logs(
        &client,
        request.address,
        request.range,
        limit,
        logs_tx,
        &cancel,
    )
    .await
}

struct ResolveCtx<N> {
    client: Arc<RateLimitedClient<N>>,
    cache: Arc<BlockCache>,
    /// Cancelled by the caller.
    cancel: CancellationToken,
    /// Child of `cancel`, used to stop the fetch stage on resolve failure.
    fetch_cancel: CancellationToken,
}

/// Owns the error channel: whatever ends the retrieval is reported from here.
async fn resolve_task<N: EthNode>(
    ctx: ResolveCtx<N>,
    logs_rx: mpsc::Receiver<LogEntry>,
    fetch: JoinHandle<Result<u64>>,
    records_tx: mpsc::Sender<TransactionRecord>,
    errors_tx: mpsc::Sender<RetrievalError>,
) {
    let outcome = resolve_all(&ctx, logs_rx, fetch, &records_tx).await;
    ctx.fetch_cancel.cancel();

    match outcome {
        Ok(emitted) => info!(%emitted, "retrieval finished"),
        Err(err) => {
            if err.is_cancelled() {
                warn!("retrieval cancelled");
            } else {
                warn!(%err, "retrieval failed");
            }
            let _ = errors_tx.send(err).await;
        }
    }
}

async fn resolve_all<N: EthNode>(
    ctx: &ResolveCtx<N>,
    mut logs_rx: mpsc::Receiver<LogEntry>,
    fetch: JoinHandle<Result<u64>>,
    records_tx: &mpsc::Sender<TransactionRecord>,
) -> Result<usize> {
    let mut fetch = FetchStage::new(fetch);
    let mut emitted = 0;

    loop {
        let log = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(RetrievalError::Cancelled),
            err = fetch.failed() => return Err(err),
            log = logs_rx.recv() => log,
        };
        let Some(log) = log else {
            break;
        };

        let resolved = tokio::select! {
            biased;
            err = fetch.failed() => return Err(err),
            res = resolve_log(&ctx.client, &ctx.cache, &log, &ctx.cancel) => res?,
        };
        let Some(record) = resolved else {
            continue;
        };

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => return Err(RetrievalError::Cancelled),
            res = records_tx.send(record) => {
                if res.is_err() {
                    debug!("record receiver dropped, stopping retrieval");
                    return Ok(emitted);
                }
            }
        }
        emitted += 1;
    }

    // The log channel only closes once the fetch stage is done.
    let logs = fetch.finish().await?;
    debug!(%logs, "log fetch complete");
    Ok(emitted)
}

/// Fetch task as seen by the resolver, so a fetch failure ends resolution as
/// soon as it happens instead of after the buffered logs.
struct FetchStage {
    handle: JoinHandle<Result<u64>>,
    /// Logs forwarded, once the task has succeeded.
    done: Option<u64>,
}

impl FetchStage {
    fn new(handle: JoinHandle<Result<u64>>) -> Self {
        Self { handle, done: None }
    }

    /// Completes with the fetch error. Never completes once the fetch task
    /// has succeeded. Cancel safe.
    async fn failed(&mut self) -> RetrievalError {
        if self.done.is_none() {
            match join(&mut self.handle).await {
                Ok(logs) => self.done = Some(logs),
                Err(err) => return err,
            }
        }
        future::pending().await
    }

    async fn finish(mut self) -> Result<u64> {
        match self.done {
            Some(logs) => Ok(logs),
            None => join(&mut self.handle).await,
        }
    }
}

async fn join(handle: &mut JoinHandle<Result<u64>>) -> Result<u64> {
    match handle.await {
        Ok(res) => res,
        Err(join_err) => Err(RetrievalError::TaskFailed(join_err.to_string())),
    }
}
