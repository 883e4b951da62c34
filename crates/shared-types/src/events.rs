//! Event payloads emitted by the upstream chain controller.
//!
//! These mirror what the controller hands the orchestrator's four
//! subscription callbacks. The pipeline never mutates them; it only reads
//! fields out and forwards opaque byte payloads (`block_header_state`,
//! `block`, `trx`, `action_traces`, `receipts`) to the variant encoder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An EOSIO-style account name. Not validated beyond non-emptiness; the
/// controller is trusted to hand back well-formed names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountName(pub String);

impl AccountName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        AccountName(s.to_string())
    }
}

impl From<String> for AccountName {
    fn from(s: String) -> Self {
        AccountName(s)
    }
}

/// An opaque block identifier (block id hash as the controller hands it
/// over — never interpreted by this crate, only hex-rendered for documents
/// and log lines).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Vec<u8>);

impl BlockId {
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An opaque serializable native payload. The pipeline treats the bytes as
/// inert cargo; only the variant encoder knows how to interpret them, and
/// only with ABI help.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaquePayload(pub Vec<u8>);

/// Emitted by the controller on every accepted block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStateEvent {
    pub block_num: u32,
    pub block_id: BlockId,
    pub validated: bool,
    pub in_current_chain: bool,
    pub block_header_state: OpaquePayload,
    pub block: BlockPayload,
}

/// The contained block with its ordered transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPayload {
    pub raw: OpaquePayload,
    pub transaction_ids: Vec<String>,
}

/// Same shape as [`BlockStateEvent`] but denotes finality.
pub type IrreversibleBlockEvent = BlockStateEvent;

/// Emitted at transaction acceptance, before application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMetadataEvent {
    pub trx_id: String,
    pub trx: OpaquePayload,
}

/// One action trace within a [`TransactionTraceEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTrace {
    pub account: AccountName,
    pub action_name: String,
    /// `true` when `action_name == "setabi"` and this trace carries a new
    /// ABI for `account` — the one case the encoder rewrites in place.
    pub is_setabi: bool,
    pub data: OpaquePayload,
}

/// Emitted at transaction application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionTraceEvent {
    pub trx_id: String,
    pub action_traces: Vec<ActionTrace>,
    pub success: bool,
    pub receipts: OpaquePayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_renders_lowercase_hex() {
        let id = BlockId(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(id.to_hex(), "deadbeef");
        assert_eq!(id.to_string(), "deadbeef");
    }

    #[test]
    fn account_name_roundtrips_through_from() {
        let a: AccountName = "alice".into();
        assert_eq!(a.as_str(), "alice");
    }
}
