use reqwest::{Client, StatusCode};
use swaplist_primitives::TransactionRecord;
use tracing::debug;

use crate::{error::ExplorerError, request::ExplorerRequest, response::parse_tx_list};

/// Gnosis Scan API endpoint.
pub const DEFAULT_EXPLORER_URL: &str = "https://api.gnosisscan.io/api";

/// Client for an Etherscan compatible explorer API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Lists up to `request.amount` transactions sent to `request.address`.
    pub async fn transactions(
        &self,
        request: &ExplorerRequest,
    ) -> Result<Vec<TransactionRecord>, ExplorerError> {
        let query = request.to_query()?;
        debug!(
            address = %query.address,
            from = query.start_block,
            to = query.end_block,
            offset = query.offset,
            sort = %query.sort,
            "querying explorer"
        );

        let response = self
            .http
            .get(&self.base_url)
            .query(&query.pairs())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ExplorerError::Status(status));
        }

        let body = response.text().await?;
        parse_tx_list(&body)
    }
}
