use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use swaplist_primitives::{Address, TransactionRecord};

use crate::error::ExplorerError;

const NO_TRANSACTIONS: &str = "No transactions found";

#[derive(Debug, Deserialize)]
struct TxListResponse {
    status: String,
    message: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct TxListEntry {
    from: String,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

/// Decodes a `txlist` body into records, in the order the explorer sent them.
pub(crate) fn parse_tx_list(body: &str) -> Result<Vec<TransactionRecord>, ExplorerError> {
    let response: TxListResponse =
        serde_json::from_str(body).map_err(|e| ExplorerError::decode(e.to_string()))?;

    if response.status != "1" {
        if response.message.starts_with(NO_TRANSACTIONS) {
            return Ok(Vec::new());
        }
        let detail = match response.result {
            Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(ExplorerError::Api {
            message: response.message,
            detail,
        });
    }

    let entries: Vec<TxListEntry> =
        serde_json::from_value(response.result).map_err(|e| ExplorerError::decode(e.to_string()))?;

    entries.into_iter().map(record_from_entry).collect()
}

fn record_from_entry(entry: TxListEntry) -> Result<TransactionRecord, ExplorerError> {
    let sender = Address::from_str(&entry.from)
        .map_err(|e| ExplorerError::decode(format!("sender {:?}: {e}", entry.from)))?;
    let timestamp = entry
        .time_stamp
        .parse::<u64>()
        .map_err(|e| ExplorerError::decode(format!("timestamp {:?}: {e}", entry.time_stamp)))?;
    Ok(TransactionRecord::new(sender, timestamp))
}
