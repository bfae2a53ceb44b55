//! swaplist
//!
//! Lists the senders of transactions that interacted with a contract, together
//! with the block timestamp, either by scanning the contract logs through a node
//! (`full`) or by asking a block explorer (`limit`).

mod args;
mod cmd;
mod errors;
mod signal;

use std::{env, process};

use args::Args;
use errors::{AppError, Result};
use signal::spawn_signal_listener;
use swaplist_common::logging::{self, FileLoggingConfig, LoggerConfig};
use swaplist_config::{Config, LoggingConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

const SERVICE_NAME: &str = "swaplist";

fn main() {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn main_inner(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    // Init the logging before we do anything else.
    init_logging(&config.logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("swaplist-rt")
        .build()
        .map_err(AppError::Runtime)?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        spawn_signal_listener(cancel.clone());
        let res = cmd::dispatch(args.subc, &config, cancel.clone()).await;
        // Stops the signal listener.
        cancel.cancel();
        res
    })
}

/// Loads the optional config file and layers environment overrides on top.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides(|key| env::var(key).ok());
    Ok(config)
}

fn logger_config(config: &LoggingConfig) -> LoggerConfig {
    let json = config.json_format.unwrap_or(false);
    let mut lconfig = LoggerConfig::new(SERVICE_NAME.to_string()).with_json_logging(json);

    if let Some(dir) = &config.log_dir {
        let file_config = FileLoggingConfig::new(dir.clone(), config.log_file_prefix.clone())
            .with_json_format(json);
        lconfig = lconfig.with_file_logging(file_config);
    }
    lconfig
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    let lconfig = logger_config(config);
    let file_logging_config = lconfig.file_logging_config.clone();

    logging::init(lconfig)?;

    if let Some(file_config) = &file_logging_config {
        info!(
            log_dir = %file_config.directory.display(),
            log_prefix = %file_config.file_name_prefix,
            "file logging enabled"
        );
    }
    Ok(())
}
