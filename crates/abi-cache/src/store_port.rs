//! The cache's one outbound dependency: looking up an account's raw `abi`
//! bytes in the document store. Expressed as a trait so the cache's
//! eviction and touch logic can be unit-tested against a fake without
//! spinning up an HTTP server.

use es_document_store::{DocumentStoreClient, StoreError};
use serde_json::Value;
use shared_types::{AccountName, DocumentKind};

pub trait AccountAbiLookup {
    /// Looks up the `accounts` document for `account`. Returns `Ok(None)`
    /// when the store reports anything other than exactly one matching
    /// document (absent, or — which should never legitimately happen —
    /// more than one).
    fn find_account_abi(&self, account: &AccountName) -> Result<Option<Vec<u8>>, StoreError>;
}

impl AccountAbiLookup for DocumentStoreClient {
    fn find_account_abi(&self, account: &AccountName) -> Result<Option<Vec<u8>>, StoreError> {
        let query = serde_json::json!({
            "query": { "term": { "name": account.as_str() } }
        });
        let response = self.search(DocumentKind::Accounts, &query)?;
        let hits = response
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if hits.len() != 1 {
            return Ok(None);
        }
        let abi = hits[0].get("_source").and_then(|s| s.get("abi")).cloned();
        match abi {
            Some(value) => Ok(serde_json::to_vec(&value).ok()),
            None => Ok(None),
        }
    }
}
