//! The ABI cache's real, document-store-backed [`AccountAbiLookup`] impl
//! feeding the variant encoder's action-data decode, against a wiremock
//! document store — the same resolve/decode path the consumer loop drives
//! per trace, but exercised here through the real HTTP lookup rather than
//! a fake.
