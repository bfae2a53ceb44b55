use std::{
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
};

use argh::FromArgs;
use swaplist_explorer::SortOrder;

/// Contract queried when no address is given.
pub(crate) const DEFAULT_CONTRACT: &str = "0xc2d5a532cf69aa9a1378737d8ccdef884b6e7420";

const DEFAULT_FULL_START_BLOCK: u64 = 19_475_474;
const DEFAULT_FULL_END_BLOCK: u64 = 19_475_479;
const DEFAULT_LIMIT_AMOUNT: u32 = 1000;

fn default_contract() -> String {
    DEFAULT_CONTRACT.to_owned()
}

#[derive(Debug, FromArgs)]
#[argh(description = "Lists the senders of transactions that interacted with a contract")]
pub(crate) struct Args {
    #[argh(option, short = 'c', description = "path to a TOML config file")]
    pub(crate) config: Option<PathBuf>,

    #[argh(subcommand)]
    pub(crate) subc: Subcommand,
}

#[derive(Debug, FromArgs, PartialEq)]
#[argh(subcommand)]
pub(crate) enum Subcommand {
    Full(SubcFull),
    Limit(SubcLimit),
}

/// Full retrieval from contract logs through a node.
#[derive(Debug, FromArgs, PartialEq)]
#[argh(
    subcommand,
    name = "full",
    description = "retrieve every sender with timestamp from the contract logs, saving as they arrive"
)]
pub(crate) struct SubcFull {
    #[argh(
        option,
        short = 'a',
        default = "default_contract()",
        description = "contract address"
    )]
    pub(crate) address: String,

    #[argh(option, default = "DEFAULT_FULL_START_BLOCK", description = "start block")]
    pub(crate) start: u64,

    #[argh(
        option,
        default = "DEFAULT_FULL_END_BLOCK",
        description = "end block, 0 for no upper bound"
    )]
    pub(crate) end: u64,

    #[argh(option, short = 'e', description = "node RPC endpoint")]
    pub(crate) endpoint: Option<String>,

    #[argh(
        option,
        short = 'm',
        description = "maximum node requests per second, 0 disables throttling"
    )]
    pub(crate) max_request: Option<u32>,

    #[argh(option, short = 'b', description = "maximum blocks per log query")]
    pub(crate) block_range_limit: Option<NonZeroU64>,

    #[argh(option, short = 'o', description = "output file")]
    pub(crate) output: Option<PathBuf>,
}

impl SubcFull {
    /// Rate limit requested on the command line, if any. `Some(None)` means
    /// throttling was explicitly disabled.
    pub(crate) fn rate_limit(&self) -> Option<Option<NonZeroU32>> {
        self.max_request.map(NonZeroU32::new)
    }
}

/// Bounded retrieval through the block explorer API.
#[derive(Debug, FromArgs, PartialEq)]
#[argh(
    subcommand,
    name = "limit",
    description = "retrieve up to 10000 senders with timestamps from the block explorer API"
)]
pub(crate) struct SubcLimit {
    #[argh(
        option,
        short = 'a',
        default = "default_contract()",
        description = "contract address"
    )]
    pub(crate) address: String,

    #[argh(
        option,
        short = 'n',
        default = "DEFAULT_LIMIT_AMOUNT",
        description = "number of transactions to retrieve (1-10000)"
    )]
    pub(crate) number: u32,

    #[argh(
        option,
        default = "SortOrder::Asc",
        description = "order to retrieve transactions in (asc/desc)"
    )]
    pub(crate) order: SortOrder,

    #[argh(option, short = 'k', description = "block explorer API key")]
    pub(crate) apikey: Option<String>,

    #[argh(option, default = "0", description = "start block")]
    pub(crate) start: u64,

    #[argh(option, default = "0", description = "end block, 0 for no upper bound")]
    pub(crate) end: u64,

    #[argh(option, short = 'o', description = "output file")]
    pub(crate) output: Option<PathBuf>,
}
