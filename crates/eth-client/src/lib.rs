//! Access to an EVM node for the retrieval pipeline.
//!
//! [`EthNode`] is the raw node surface. [`RateLimitedClient`] wraps any node,
//! serialises calls through one lock, throttles them to a fixed rate and makes
//! every call observe a cancellation token.

mod client;
mod error;
mod node;

pub use client::RateLimitedClient;
pub use error::{EthClientError, EthClientResult};
pub use node::{AlloyNode, EthNode};
