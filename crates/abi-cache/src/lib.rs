//! # ABI Cache
//!
//! A bounded cache of per-account binary-interface descriptors, keyed by
//! account name, with lookups falling through to the document store's
//! `accounts` document kind on a miss.
//!
//! Two indexes live over the same entry set: a primary `HashMap` keyed by
//! account, and a secondary `BTreeMap` keyed by last-access timestamp so
//! eviction always finds the least-recently-accessed entry in `O(log n)`.
//! Only the consumer thread ever touches this cache, so no internal locking
//! is needed.

pub mod cache;
pub mod descriptor;
pub mod store_port;

pub use cache::AbiCache;
pub use descriptor::{decode_descriptor_bytes, encode_descriptor, AbiDescriptor};
pub use store_port::AccountAbiLookup;
