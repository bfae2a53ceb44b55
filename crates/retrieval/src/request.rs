use std::str::FromStr;

use swaplist_primitives::{Address, BlockRange, EndBlock};

use crate::error::ValidationError;

/// A caller's request, as received.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetrievalRequest {
    /// Contract address, hex encoded.
    pub address: String,
    pub start_block: u64,
    pub end_block: EndBlock,
}

/// A request that passed validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ValidatedRequest {
    pub address: Address,
    pub range: BlockRange,
}

impl RetrievalRequest {
    pub fn new(address: impl Into<String>, start_block: u64, end_block: EndBlock) -> Self {
        Self {
            address: address.into(),
            start_block,
            end_block,
        }
    }

    /// Checks the request and resolves an open end to a concrete block.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let raw = self.address.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        let address =
            Address::from_str(raw).map_err(|e| ValidationError::InvalidAddress {
                address: self.address.clone(),
                reason: e.to_string(),
            })?;

        let end = self.end_block.resolve();
        let range = BlockRange::new(self.start_block, end).ok_or(
            ValidationError::StartAfterEnd {
                start: self.start_block,
                end,
            },
        )?;

        Ok(ValidatedRequest { address, range })
    }
}
