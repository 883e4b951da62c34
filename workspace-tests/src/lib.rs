//! # Workspace Integration Tests
//!
//! Cross-crate tests exercising real adapter implementations together
//! rather than the per-crate test doubles each subsystem crate tests
//! against in isolation:
//!
//! - `reconciler_http_flow`: the real [`indexer_node::adapters::HttpChainTableClient`]
//!   feeding a [`blacklist_reconciler::BlacklistReconciler`] mounted behind
//!   the real [`blacklist_api::router`], against a wiremock chain RPC.
//! - `action_trace_pipeline_flow`: the ABI cache's real document-store-backed
//!   [`abi_cache::AccountAbiLookup`] impl feeding the variant encoder, against
//!   a wiremock document store.

pub mod action_trace_pipeline_flow;
pub mod reconciler_http_flow;
