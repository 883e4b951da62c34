//! # Blacklist HTTP Surface
//!
//! Exposes the blacklist reconciler's one operation, `check_hash`, over
//! HTTP. Handler exceptions are caught at this crate's boundary and
//! rendered as a JSON error body — the router never panics a request
//! thread for a reconciler failure.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{router, warn_if_not_loopback, AppState};
