mod full;
mod limit;

use swaplist_config::Config;
use tokio_util::sync::CancellationToken;

use crate::{args::Subcommand, errors::Result};

pub(crate) async fn dispatch(subc: Subcommand, config: &Config, cancel: CancellationToken) -> Result<()> {
    match subc {
        Subcommand::Full(args) => full::run(args, config, cancel).await,
        Subcommand::Limit(args) => limit::run(args, config, cancel).await,
    }
}
