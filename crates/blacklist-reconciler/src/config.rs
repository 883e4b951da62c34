//! Reconciler configuration: the blacklist contract/table names and the
//! local actor-blacklist this producer enforces.

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// `blacklist-contract`, default `theblacklist`. Also used as the
    /// table scope, matching the upstream contract's own convention.
    pub contract: String,
    /// `blacklist-permission`, default `blacklist`. Not consulted by
    /// `check_hash` itself — carried here because it's this plugin's
    /// option, consumed when signing a correction submission.
    pub permission: String,
    /// `producer-name`; `None` when unset, in which case the submitted
    /// hash is always treated as empty.
    pub producer_name: Option<String>,
    /// `actor-blacklist`, the locally configured account set.
    pub local_accounts: Vec<String>,
    /// Row limit applied to every on-chain table read (hard-coded to 100
    /// upstream; exposed here only so tests can exercise other values).
    pub table_read_limit: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            contract: "theblacklist".to_string(),
            permission: "blacklist".to_string(),
            producer_name: None,
            local_accounts: Vec::new(),
            table_read_limit: 100,
        }
    }
}
