use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("address is required")]
    EmptyAddress,

    #[error("amount {0} out of range, expected 1..=10000")]
    AmountOutOfRange(u32),

    #[error("invalid sort order {0:?}, expected asc or desc")]
    InvalidOrder(String),

    #[error("api key is required")]
    EmptyApiKey,

    #[error("start block {start} is after end block {end}")]
    StartAfterEnd { start: u64, end: u64 },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status: {0}")]
    Status(StatusCode),

    #[error("explorer error: {message}: {detail}")]
    Api { message: String, detail: String },

    #[error("malformed explorer response: {0}")]
    Decode(String),
}

impl ExplorerError {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// True for rejections raised before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyAddress
                | Self::AmountOutOfRange(_)
                | Self::InvalidOrder(_)
                | Self::EmptyApiKey
                | Self::StartAfterEnd { .. }
        )
    }
}
