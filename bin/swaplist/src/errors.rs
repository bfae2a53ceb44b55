use std::io;

use swaplist_common::logging::LoggingError;
use swaplist_config::ConfigError;
use swaplist_explorer::ExplorerError;
use swaplist_filestore::FileStoreError;
use swaplist_retrieval::RetrievalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("error retrieving transactions: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("error retrieving transactions: {0}")]
    Explorer(#[from] ExplorerError),

    #[error("failed to save transactions: {0}")]
    FileStore(#[from] FileStoreError),

    #[error("interrupted")]
    Interrupted,

    #[error("{0}")]
    Task(String),
}

pub(crate) type Result<T> = std::result::Result<T, AppError>;
