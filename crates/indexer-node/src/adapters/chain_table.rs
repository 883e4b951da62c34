//! [`ChainTableReader`] against a live chain node's `get_table_rows` RPC
//! (the read-only multi-index table query every EOSIO-compatible chain API
//! exposes). Blocking, matching the document store client's own style —
//! both are single-thread, read/write-once collaborators, never shared
//! across the producer/consumer boundary.

use blacklist_reconciler::{ChainReadError, ChainRow, ChainTableReader};
use reqwest::blocking::Client;
use serde_json::json;

pub struct HttpChainTableClient {
    http: Client,
    base_url: String,
}

impl HttpChainTableClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("reqwest blocking client construction");
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl ChainTableReader for HttpChainTableClient {
    fn read_rows(&self, code: &str, scope: &str, table: &str, limit: u32) -> Result<Vec<ChainRow>, ChainReadError> {
        let url = format!("{}/v1/chain/get_table_rows", self.base_url);
        let body = json!({
            "code": code,
            "scope": scope,
            "table": table,
            "json": true,
            "limit": limit,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| ChainReadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChainReadError::Transport(format!("HTTP {}", response.status())));
        }

        let parsed: serde_json::Value = response.json().map_err(|e| ChainReadError::Transport(e.to_string()))?;
        let rows = parsed
            .get("rows")
            .and_then(|r| r.as_array())
            .cloned()
            .ok_or_else(|| ChainReadError::Transport("response missing 'rows' array".to_string()))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_non_success_status_is_a_transport_error() {
        // No live server reachable at this port; exercises the connect
        // failure path without needing a mock HTTP server for this
        // single-purpose adapter.
        let client = HttpChainTableClient::new("http://127.0.0.1:1");
        let err = client.read_rows("theblacklist", "theblacklist", "theblacklist", 100).unwrap_err();
        assert!(matches!(err, ChainReadError::Transport(_)));
    }
}
