//! Streams the senders and timestamps of every transaction that emitted a log
//! from a contract, over a block range.
//!
//! The range is queried in bounded chunks by a fetch task; a resolve task turns
//! each log into a [`TransactionRecord`](swaplist_primitives::TransactionRecord)
//! and forwards it to the caller through a [`RetrievalHandle`].

mod error;
mod fetcher;
mod pipeline;
mod request;
mod resolver;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ErrorKind, RetrievalError, Stage, ValidationError};
pub use pipeline::{RetrievalHandle, Retriever, DEFAULT_LOG_BUFFER, DEFAULT_RESULT_BUFFER};
pub use request::{RetrievalRequest, ValidatedRequest};
