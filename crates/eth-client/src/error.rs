use thiserror::Error;

pub type EthClientResult<T> = Result<T, EthClientError>;

#[derive(Debug, Error)]
pub enum EthClientError {
    #[error("failed to connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("cancelled while waiting for the rate limiter")]
    RateLimitCancelled,

    #[error("cancelled during node call")]
    Cancelled,

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed node response: {0}")]
    MalformedResponse(String),
}

impl EthClientError {
    pub fn connection(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// True for both flavours of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::RateLimitCancelled)
    }
}
