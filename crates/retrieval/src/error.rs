use std::fmt;

use swaplist_eth_client::EthClientError;
use swaplist_primitives::{BlockHash, BlockRange, TxHash};
use thiserror::Error;

/// Rejections raised before any node call is made.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("address is required")]
    EmptyAddress,

    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("start block {start} is after end block {end}")]
    StartAfterEnd { start: u64, end: u64 },
}

/// Terminal error of a retrieval. At most one is reported per request.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("node connection failed: {0}")]
    Connection(#[source] EthClientError),

    #[error("failed to fetch logs for blocks {window}: {source}")]
    LogFetch {
        window: BlockRange,
        #[source]
        source: EthClientError,
    },

    #[error("failed to resolve transaction {tx_hash}: {source}")]
    Resolve {
        tx_hash: TxHash,
        #[source]
        source: EthClientError,
    },

    #[error("transaction {tx_hash} not found in block {block_hash}")]
    TransactionNotFoundInBlock {
        tx_hash: TxHash,
        block_hash: BlockHash,
    },

    #[error("retrieval cancelled")]
    Cancelled,

    #[error("retrieval task failed: {0}")]
    TaskFailed(String),
}

/// Coarse classification of a [`RetrievalError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Validation,
    Connection,
    Rpc,
    Consistency,
    Cancellation,
    Internal,
}

/// Pipeline stage an error originated from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    Validate,
    Connect,
    FetchLogs,
    Resolve,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Validate => "validate",
            Stage::Connect => "connect",
            Stage::FetchLogs => "fetch logs",
            Stage::Resolve => "resolve",
        };
        f.write_str(s)
    }
}

impl RetrievalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RetrievalError::Validation(_) => ErrorKind::Validation,
            RetrievalError::Connection(_) => ErrorKind::Connection,
            RetrievalError::LogFetch { .. } | RetrievalError::Resolve { .. } => ErrorKind::Rpc,
            RetrievalError::TransactionNotFoundInBlock { .. } => ErrorKind::Consistency,
            RetrievalError::Cancelled => ErrorKind::Cancellation,
            RetrievalError::TaskFailed(_) => ErrorKind::Internal,
        }
    }

    /// Stage the error was raised in, `None` when not tied to one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RetrievalError::Validation(_) => Some(Stage::Validate),
            RetrievalError::Connection(_) => Some(Stage::Connect),
            RetrievalError::LogFetch { .. } => Some(Stage::FetchLogs),
            RetrievalError::Resolve { .. } | RetrievalError::TransactionNotFoundInBlock { .. } => {
                Some(Stage::Resolve)
            }
            RetrievalError::Cancelled | RetrievalError::TaskFailed(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetrievalError::Cancelled)
    }

    pub(crate) fn log_fetch(window: BlockRange, source: EthClientError) -> Self {
        if source.is_cancelled() {
            RetrievalError::Cancelled
        } else {
            RetrievalError::LogFetch { window, source }
        }
    }

    pub(crate) fn resolve(tx_hash: TxHash, source: EthClientError) -> Self {
        if source.is_cancelled() {
            RetrievalError::Cancelled
        } else {
            RetrievalError::Resolve { tx_hash, source }
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, RetrievalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_cancellation_maps_to_cancelled() {
        let window = BlockRange::new(1, 5).unwrap();
        let err = RetrievalError::log_fetch(window, EthClientError::RateLimitCancelled);
        assert!(err.is_cancelled());

        let err = RetrievalError::resolve(TxHash::ZERO, EthClientError::Cancelled);
        assert_eq!(err.kind(), ErrorKind::Cancellation);
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_rpc_errors_keep_stage() {
        let window = BlockRange::new(105, 109).unwrap();
        let err = RetrievalError::log_fetch(window, EthClientError::rpc("limit exceeded"));
        assert_eq!(err.kind(), ErrorKind::Rpc);
        assert_eq!(err.stage(), Some(Stage::FetchLogs));
        assert!(err.to_string().contains("105..=109"));

        let err = RetrievalError::resolve(TxHash::ZERO, EthClientError::not_found("block"));
        assert_eq!(err.stage(), Some(Stage::Resolve));
    }

    #[test]
    fn test_consistency_kind() {
        let err = RetrievalError::TransactionNotFoundInBlock {
            tx_hash: TxHash::ZERO,
            block_hash: BlockHash::ZERO,
        };
        assert_eq!(err.kind(), ErrorKind::Consistency);
        assert_eq!(err.stage(), Some(Stage::Resolve));
    }
}
