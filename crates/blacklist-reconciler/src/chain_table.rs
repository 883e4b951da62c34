//! The reconciler's one outbound dependency: reading rows out of an
//! on-chain multi-index table. Expressed as a trait, matching the cache's
//! store-port pattern, so `check_hash` can be tested without a live chain.

use serde_json::Value;

/// One row of a table read, already deserialized from the node's JSON
/// representation (`json=true` on the underlying read request).
pub type ChainRow = Value;

pub trait ChainTableReader {
    /// Reads up to `limit` rows of `(code, scope, table)`. The on-chain
    /// read itself hard-codes a row limit of 100 upstream of this trait;
    /// rows beyond that limit are dropped by the node, not by this client.
    fn read_rows(&self, code: &str, scope: &str, table: &str, limit: u32) -> Result<Vec<ChainRow>, ChainReadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChainReadError {
    #[error("on-chain table read failed: {0}")]
    Transport(String),
}
