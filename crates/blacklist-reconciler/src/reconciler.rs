//! `check_hash`: the reconciler's one public operation.

use thiserror::Error;

use crate::chain_table::{ChainReadError, ChainTableReader};
use crate::config::ReconcilerConfig;
use crate::snapshot::BlacklistSnapshot;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    ChainRead(#[from] ChainReadError),
}

/// The result of a reconciliation check: all three hashes plus the
/// human-readable verdict message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckHashResult {
    pub local_hash: String,
    pub onchain_hash: String,
    pub submitted_hash: String,
    pub message: String,
}

pub struct BlacklistReconciler<R: ChainTableReader> {
    config: ReconcilerConfig,
    chain: R,
}

impl<R: ChainTableReader> BlacklistReconciler<R> {
    pub fn new(config: ReconcilerConfig, chain: R) -> Self {
        Self { config, chain }
    }

    pub fn check_hash(&self) -> Result<CheckHashResult, ReconcileError> {
        let local = BlacklistSnapshot::new(self.config.local_accounts.clone());

        let onchain_accounts = self.read_onchain_blacklist()?;
        let onchain = BlacklistSnapshot::new(onchain_accounts);

        let submitted_hash = self.read_submitted_hash()?;

        let local_hash = local.fingerprint();
        let onchain_hash = onchain.fingerprint();

        let message = if local_hash != onchain_hash {
            "local and ecaf hash MISMATCH!"
        } else if local_hash != submitted_hash {
            "local and submitted hash MISMATCH!"
        } else {
            "OK"
        }
        .to_string();

        Ok(CheckHashResult {
            local_hash,
            onchain_hash,
            submitted_hash,
            message,
        })
    }

    fn read_onchain_blacklist(&self) -> Result<Vec<String>, ReconcileError> {
        let rows = self.chain.read_rows(
            &self.config.contract,
            &self.config.contract,
            &self.config.contract,
            self.config.table_read_limit,
        )?;
        let mut accounts = Vec::new();
        for row in rows {
            if row.get("type").and_then(|t| t.as_str()) != Some("actor-blacklist") {
                continue;
            }
            if let Some(names) = row.get("accounts").and_then(|a| a.as_array()) {
                for name in names {
                    if let Some(s) = name.as_str() {
                        accounts.push(s.to_string());
                    }
                }
            }
        }
        Ok(accounts)
    }

    fn read_submitted_hash(&self) -> Result<String, ReconcileError> {
        let Some(producer_name) = &self.config.producer_name else {
            return Ok(String::new());
        };
        let rows = self.chain.read_rows(&self.config.contract, &self.config.contract, "producerhash", self.config.table_read_limit)?;
        for row in rows {
            if row.get("producer").and_then(|p| p.as_str()) == Some(producer_name.as_str()) {
                return Ok(row.get("hash").and_then(|h| h.as_str()).unwrap_or_default().to_string());
            }
        }
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeChain {
        blacklist_rows: Vec<ChainRow>,
        producerhash_rows: Vec<ChainRow>,
    }

    use crate::chain_table::ChainRow;

    impl ChainTableReader for FakeChain {
        fn read_rows(&self, _code: &str, _scope: &str, table: &str, _limit: u32) -> Result<Vec<ChainRow>, ChainReadError> {
            match table {
                "theblacklist" => Ok(self.blacklist_rows.clone()),
                "producerhash" => Ok(self.producerhash_rows.clone()),
                other => panic!("unexpected table {other}"),
            }
        }
    }

    fn reconciler(local: &[&str], onchain: &[&str], submitted: Option<&str>, producer: &str) -> BlacklistReconciler<FakeChain> {
        let chain = FakeChain {
            blacklist_rows: vec![json!({"type": "actor-blacklist", "accounts": onchain})],
            producerhash_rows: match submitted {
                Some(hash) => vec![json!({"producer": producer, "hash": hash})],
                None => vec![],
            },
        };
        let config = ReconcilerConfig {
            local_accounts: local.iter().map(|s| s.to_string()).collect(),
            producer_name: Some(producer.to_string()),
            ..ReconcilerConfig::default()
        };
        BlacklistReconciler::new(config, chain)
    }

    #[test]
    fn scenario_matching_everything_reports_ok() {
        let local_hash = BlacklistSnapshot::new(["a", "b"]).fingerprint();
        let r = reconciler(&["a", "b"], &["a", "b"], Some(&local_hash), "alice");
        let result = r.check_hash().unwrap();
        assert_eq!(result.message, "OK");
        assert_eq!(result.local_hash, result.onchain_hash);
        assert_eq!(result.local_hash, result.submitted_hash);
    }

    #[test]
    fn onchain_mismatch_wins_over_submitted_mismatch() {
        let r = reconciler(&["a", "b"], &["a", "b", "c"], None, "alice");
        let result = r.check_hash().unwrap();
        assert_eq!(result.message, "local and ecaf hash MISMATCH!");
    }

    #[test]
    fn submitted_mismatch_when_onchain_matches_but_submitted_is_empty() {
        let r = reconciler(&["a", "b"], &["a", "b"], None, "alice");
        let result = r.check_hash().unwrap();
        assert_eq!(result.message, "local and submitted hash MISMATCH!");
        assert_eq!(result.submitted_hash, "");
    }

    #[test]
    fn literal_scenario_one_hashes_sorted_canonical_bytes() {
        let config = ReconcilerConfig {
            local_accounts: vec!["bob".into(), "alice".into(), "carol".into()],
            producer_name: Some("alice".to_string()),
            ..ReconcilerConfig::default()
        };
        let chain = FakeChain { blacklist_rows: vec![], producerhash_rows: vec![] };
        let r = BlacklistReconciler::new(config, chain);
        let result = r.check_hash().unwrap();
        let expected = BlacklistSnapshot::new(["alice", "bob", "carol"]).fingerprint();
        assert_eq!(result.local_hash, expected);
    }

    #[test]
    fn no_producer_name_means_empty_submitted_hash() {
        let config = ReconcilerConfig {
            local_accounts: vec!["a".into()],
            producer_name: None,
            ..ReconcilerConfig::default()
        };
        let chain = FakeChain {
            blacklist_rows: vec![json!({"type": "actor-blacklist", "accounts": ["a"]})],
            producerhash_rows: vec![json!({"producer": "someone", "hash": "deadbeef"})],
        };
        let r = BlacklistReconciler::new(config, chain);
        let result = r.check_hash().unwrap();
        assert_eq!(result.submitted_hash, "");
    }

    #[test]
    fn non_actor_blacklist_rows_are_ignored() {
        let chain = FakeChain {
            blacklist_rows: vec![
                json!({"type": "something-else", "accounts": ["x"]}),
                json!({"type": "actor-blacklist", "accounts": ["a"]}),
            ],
            producerhash_rows: vec![],
        };
        let config = ReconcilerConfig {
            local_accounts: vec!["a".into()],
            ..ReconcilerConfig::default()
        };
        let r = BlacklistReconciler::new(config, chain);
        let result = r.check_hash().unwrap();
        assert_eq!(result.onchain_hash, BlacklistSnapshot::new(["a"]).fingerprint());
    }
}
