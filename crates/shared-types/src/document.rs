//! The document model written to the external store.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The logical type tag a document is stored under. Each kind maps to a
/// fixed path segment on the document store (`/<index>/<kind>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BlockStates,
    Blocks,
    Transactions,
    TransactionTraces,
    Actions,
    Accounts,
}

impl DocumentKind {
    /// The path segment used when addressing this kind on the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::BlockStates => "block_states",
            DocumentKind::Blocks => "blocks",
            DocumentKind::Transactions => "transactions",
            DocumentKind::TransactionTraces => "transaction_traces",
            DocumentKind::Actions => "actions",
            DocumentKind::Accounts => "accounts",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON document bound for a particular document kind, optionally with an
/// explicit id (used when the pipeline later needs to address the same
/// document again, e.g. the `accounts` document for a `setabi` account).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub kind: DocumentKind,
    pub id: Option<String>,
    pub body: Value,
}

impl Document {
    pub fn new(kind: DocumentKind, body: Value) -> Self {
        Self {
            kind,
            id: None,
            body,
        }
    }

    pub fn with_id(kind: DocumentKind, id: impl Into<String>, body: Value) -> Self {
        Self {
            kind,
            id: Some(id.into()),
            body,
        }
    }

    /// Stamps `createAt` (milliseconds since epoch) onto the document body,
    /// overwriting any existing value. Every persisted document kind carries
    /// this field.
    pub fn stamp_created_at(mut self, millis_since_epoch: u64) -> Self {
        if let Value::Object(ref mut map) = self.body {
            map.insert("createAt".to_string(), Value::from(millis_since_epoch));
        }
        self
    }
}
