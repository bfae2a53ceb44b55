use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use swaplist_primitives::EndBlock;

use crate::error::ExplorerError;

/// Largest page the explorer serves.
pub const MAX_AMOUNT: u32 = 10_000;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ExplorerError::InvalidOrder(other.to_owned())),
        }
    }
}

/// Parameters of one `txlist` lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExplorerRequest {
    pub address: String,
    /// Number of transactions to return, `1..=10000`.
    pub amount: u32,
    pub order: SortOrder,
    pub start_block: u64,
    pub end_block: EndBlock,
    pub api_key: String,
}

/// Validated query string parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TxListQuery {
    pub(crate) address: String,
    pub(crate) start_block: u64,
    pub(crate) end_block: u64,
    pub(crate) page: u32,
    pub(crate) offset: u32,
    pub(crate) sort: SortOrder,
    pub(crate) api_key: String,
}

impl ExplorerRequest {
    pub(crate) fn to_query(&self) -> Result<TxListQuery, ExplorerError> {
        if self.address.trim().is_empty() {
            return Err(ExplorerError::EmptyAddress);
        }
        if !(1..=MAX_AMOUNT).contains(&self.amount) {
            return Err(ExplorerError::AmountOutOfRange(self.amount));
        }
        if self.api_key.trim().is_empty() {
            return Err(ExplorerError::EmptyApiKey);
        }

        let end_block = self.end_block.resolve();
        if self.start_block > end_block {
            return Err(ExplorerError::StartAfterEnd {
                start: self.start_block,
                end: end_block,
            });
        }

        // A full page is only served as page 0.
        let page = if self.amount == MAX_AMOUNT { 0 } else { 1 };

        Ok(TxListQuery {
            address: self.address.trim().to_owned(),
            start_block: self.start_block,
            end_block,
            page,
            offset: self.amount,
            sort: self.order,
            api_key: self.api_key.clone(),
        })
    }
}

impl TxListQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("module", "account".to_owned()),
            ("action", "txlist".to_owned()),
            ("address", self.address.clone()),
            ("startblock", self.start_block.to_string()),
            ("endblock", self.end_block.to_string()),
            ("page", self.page.to_string()),
            ("offset", self.offset.to_string()),
            ("sort", self.sort.to_string()),
            ("apikey", self.api_key.clone()),
        ]
    }
}
