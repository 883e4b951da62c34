//! # Document Store Client
//!
//! A typed, blocking HTTP client for the external Elasticsearch-compatible
//! document store. Every operation targets one configured index and tries
//! each configured base URL in turn. The client carries no other state, so
//! it is safe to construct once and call repeatedly from a single thread —
//! exactly how the ingestion pipeline's consumer thread uses it.

pub mod client;
pub mod errors;

pub use client::{BulkItem, DocumentStoreClient};
pub use errors::StoreError;
