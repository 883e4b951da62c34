//! Canonical serialization and fingerprinting of an account list.
//!
//! Canonicalization sorts the accounts ascending before serializing, so
//! the resulting fingerprint is invariant under any permutation of the
//! input — the comparison this whole plugin exists to make only means
//! anything if both sides agree on one encoding.

use sha2::{Digest, Sha256};

/// A sorted snapshot of account names, ready for canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistSnapshot {
    accounts: Vec<String>,
}

impl BlacklistSnapshot {
    /// Builds a snapshot from an arbitrary (possibly unsorted, possibly
    /// duplicate-containing) account list. Sorting happens once, here.
    pub fn new(accounts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut accounts: Vec<String> = accounts.into_iter().map(Into::into).collect();
        accounts.sort();
        Self { accounts }
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    /// `"actor-blacklist=<name>\n"` per account, sorted ascending.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        for account in &self.accounts {
            out.push_str("actor-blacklist=");
            out.push_str(account);
            out.push('\n');
        }
        out.into_bytes()
    }

    /// SHA-256 of [`Self::canonical_bytes`], rendered as lowercase hex.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.canonical_bytes());
        hex_lower(&digest)
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
