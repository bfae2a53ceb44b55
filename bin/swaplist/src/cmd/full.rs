//! `full` subcommand: node-backed retrieval streamed to a file.

use std::{
    num::{NonZeroU32, NonZeroU64},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use swaplist_config::Config;
use swaplist_eth_client::RateLimitedClient;
use swaplist_filestore::{save_records_stream, FileStoreError};
use swaplist_primitives::EndBlock;
use swaplist_retrieval::{RetrievalError, RetrievalHandle, RetrievalRequest, Retriever};
use tokio::{
    task::JoinError,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    args::SubcFull,
    errors::{AppError, Result},
};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Settings for one `full` run after merging flags over the config.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FullOptions {
    pub(crate) request: RetrievalRequest,
    pub(crate) endpoint: String,
    pub(crate) rate_limit: Option<NonZeroU32>,
    pub(crate) block_range_limit: NonZeroU64,
    pub(crate) log_buffer: usize,
    pub(crate) result_buffer: usize,
    pub(crate) output: PathBuf,
}

impl FullOptions {
    pub(crate) fn resolve(args: SubcFull, config: &Config) -> Self {
        let rate_limit = args
            .rate_limit()
            .unwrap_or_else(|| config.rpc.rate_limit());
        Self {
            request: RetrievalRequest::new(args.address, args.start, EndBlock::from_raw(args.end)),
            endpoint: args.endpoint.unwrap_or_else(|| config.rpc.endpoint.clone()),
            rate_limit,
            block_range_limit: args
                .block_range_limit
                .unwrap_or(config.retrieval.block_range_limit),
            log_buffer: config.retrieval.log_buffer,
            result_buffer: config.retrieval.result_buffer,
            output: args.output.unwrap_or_else(|| config.output.path.clone()),
        }
    }
}

pub(crate) async fn run(args: SubcFull, config: &Config, cancel: CancellationToken) -> Result<()> {
    let opts = FullOptions::resolve(args, config);

    // Reject bad input before dialing the node.
    let validated = opts.request.validate().map_err(RetrievalError::from)?;
    info!(
        address = %validated.address,
        range = %validated.range,
        endpoint = %opts.endpoint,
        "retrieving senders for contract"
    );

    let client = RateLimitedClient::connect(&opts.endpoint, opts.rate_limit)
        .await
        .map_err(RetrievalError::Connection)?;
    let retriever = Retriever::new(Arc::new(client), opts.block_range_limit)
        .with_log_buffer(opts.log_buffer)
        .with_result_buffer(opts.result_buffer);

    let RetrievalHandle {
        records,
        mut errors,
    } = retriever.retrieve(&opts.request, &cancel);

    let mut saver = tokio::spawn({
        let cancel = cancel.clone();
        let output = opts.output.clone();
        async move { save_records_stream(&cancel, records, &output).await }
    });

    let mut progress = interval(PROGRESS_INTERVAL);
    progress.set_missed_tick_behavior(MissedTickBehavior::Delay);
    progress.tick().await;

    let mut saved = None;
    let retrieval_err = loop {
        tokio::select! {
            err = errors.recv() => break err,
            res = &mut saver, if saved.is_none() => {
                let res = res.map_err(writer_panicked)?;
                if res.is_err() {
                    // Nothing left to write to.
                    cancel.cancel();
                }
                saved = Some(res);
            }
            _ = progress.tick() => info!("processing..."),
        }
    };

    let saved = match saved {
        Some(saved) => saved,
        None => saver.await.map_err(writer_panicked)?,
    };

    report(retrieval_err, saved, &opts.output)
}

/// Folds the retrieval and writer outcomes into the command result.
fn report(
    retrieval_err: Option<RetrievalError>,
    saved: std::result::Result<usize, FileStoreError>,
    output: &Path,
) -> Result<()> {
    match (retrieval_err, saved) {
        (None, Ok(count)) => {
            info!(count, path = %output.display(), "all transactions have been saved");
            Ok(())
        }
        (_, Err(FileStoreError::Cancelled)) | (Some(RetrievalError::Cancelled), Ok(_)) => {
            warn!(path = %output.display(), "not all transactions have been saved");
            Err(AppError::Interrupted)
        }
        // The writer failing ends retrieval, so its error comes first.
        (_, Err(err)) => Err(err.into()),
        (Some(err), Ok(_)) => {
            warn!(kind = ?err.kind(), path = %output.display(), "retrieval stopped early");
            Err(err.into())
        }
    }
}

fn writer_panicked(err: JoinError) -> AppError {
    AppError::Task(format!("record writer failed: {err}"))
}
