//! # Indexer Node Binary
//!
//! The process entry point wiring the chain-data indexer and blacklist
//! plugin into one node, the way every other subsystem here is wired
//! together: layered configuration, a typed adapter per external
//! collaborator, and everything else owned by its own crate.

pub mod adapters;
pub mod cli;
pub mod container;
pub mod wiring;
