//! Bounded transaction listing through a block explorer's `txlist` API.
//!
//! Unlike the log based retrieval this returns at most 10000 transactions sent
//! to the contract, in a single request.

mod client;
mod error;
mod request;
mod response;

pub use client::{ExplorerClient, DEFAULT_EXPLORER_URL};
pub use error::ExplorerError;
pub use request::{ExplorerRequest, SortOrder, MAX_AMOUNT};
