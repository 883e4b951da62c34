//! # Blacklist Reconciler
//!
//! Computes a canonical fingerprint over the locally configured
//! actor-blacklist account set and compares it against two on-chain
//! fingerprints: the reference set published in the `theblacklist` table,
//! and this producer's own previously submitted hash. Entirely read-only;
//! it never mutates chain state.

pub mod chain_table;
pub mod config;
pub mod reconciler;
pub mod snapshot;

pub use chain_table::{ChainRow, ChainTableReader};
pub use config::ReconcilerConfig;
pub use reconciler::{BlacklistReconciler, CheckHashResult, ReconcileError};
pub use snapshot::BlacklistSnapshot;
