//! The real [`HttpChainTableClient`] feeding a [`BlacklistReconciler`]
//! mounted behind the real `blacklist-api` router, against a wiremock
//! chain RPC — the same `check_hash` scenarios the reconciler's own unit
//! tests exercise against a fake [`ChainTableReader`], but here through
//! the actual HTTP adapter the node binary wires in.
