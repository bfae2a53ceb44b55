//! `limit` subcommand: bounded retrieval through the block explorer.

use std::path::PathBuf;

use swaplist_config::Config;
use swaplist_explorer::{ExplorerClient, ExplorerRequest};
use swaplist_filestore::save_records;
use swaplist_primitives::EndBlock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    args::SubcLimit,
    errors::{AppError, Result},
};

fn build_request(args: SubcLimit, config: &Config) -> (ExplorerRequest, PathBuf) {
    let api_key = args
        .apikey
        .or_else(|| config.explorer.api_key.clone())
        .unwrap_or_default();
    let request = ExplorerRequest {
        address: args.address,
        amount: args.number,
        order: args.order,
        start_block: args.start,
        end_block: EndBlock::from_raw(args.end),
        api_key,
    };
    let output = args.output.unwrap_or_else(|| config.output.path.clone());
    (request, output)
}

pub(crate) async fn run(args: SubcLimit, config: &Config, cancel: CancellationToken) -> Result<()> {
    let (request, output) = build_request(args, config);
    info!(
        address = %request.address,
        amount = request.amount,
        order = %request.order,
        "retrieving senders for contract"
    );

    let client = ExplorerClient::new(config.explorer.base_url.clone());
    let records = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AppError::Interrupted),
        res = client.transactions(&request) => res?,
    };
    info!(count = records.len(), "transactions retrieved");

    info!(path = %output.display(), "saving to file...");
    save_records(&records, &output)?;
    info!("done");
    Ok(())
}
