//! # Variant Encoder
//!
//! Converts the opaque native payloads the chain controller hands the
//! pipeline into JSON-friendly structured values. Action data is the one
//! payload shape with enough context (an owning account) to resolve an ABI
//! through the cache and decode it field-by-field; every other opaque
//! payload (block headers, transactions, receipts) is rendered as a hex
//! string, since nothing downstream associates it with a contract schema.
//!
//! Failure to resolve or decode never surfaces as an error: the affected
//! field simply stays in its opaque byte form, exactly as the resolver
//! contract requires.

mod binary_reader;
mod encoder;
mod field_codec;

pub use encoder::{VariantEncoder, DEFAULT_DESERIALIZER_TIME_BUDGET};
