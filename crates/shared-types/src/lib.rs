//! # Shared Types
//!
//! Domain entities passed between the ingestion pipeline, the ABI cache, the
//! variant encoder, and the document store client. None of the types here
//! perform I/O; they are plain data plus the small amount of pure logic that
//! depends only on the shape of that data (document-kind routing, timestamp
//! stamping).

pub mod document;
pub mod errors;
pub mod events;

pub use document::{Document, DocumentKind};
pub use errors::ConfigError;
pub use events::{
    AccountName, ActionTrace, BlockId, BlockPayload, BlockStateEvent, IrreversibleBlockEvent, OpaquePayload,
    TransactionMetadataEvent, TransactionTraceEvent,
};
