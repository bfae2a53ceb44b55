//! File based configuration for the swaplist binary.

mod config;

pub use config::{
    Config, ConfigError, ExplorerConfig, LoggingConfig, OutputConfig, RetrievalConfig, RpcConfig,
    ENV_EXPLORER_API_KEY, ENV_LOG_DIR, ENV_RPC_URL,
};
