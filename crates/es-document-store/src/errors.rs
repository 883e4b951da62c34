use thiserror::Error;

/// Failures a document store operation can raise. All four map directly to
/// the store's own failure surface; no kind wraps a retry or dead-letter
/// policy since this client applies none.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Every configured base URL failed at the transport level (DNS,
    /// connect, TLS, or timeout).
    #[error("connection to document store failed: {0}")]
    Connection(String),

    /// The store responded outside the 2xx range.
    #[error("document store returned HTTP {status}: {body}")]
    ResponseCode { status: u16, body: String },

    /// A bulk request completed but `errors` was non-zero in the response.
    #[error("bulk request had {failed_items} failing item(s) out of {total_items}")]
    BulkFail { failed_items: usize, total_items: usize },

    /// The response body wasn't the shape this client expected.
    #[error("failed to decode document store response: {0}")]
    Decode(String),
}
