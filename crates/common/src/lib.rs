//! Functionality shared by the swaplist crates that is not tied to retrieval.

pub mod logging;
