use prometheus::{Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// The indexer's Prometheus metrics, grouped under one registry so the
/// binary can expose a single `/metrics` scrape endpoint.
pub struct Metrics {
    registry: Registry,
    pub queue_depth: GaugeVec,
    pub producer_sleep_ms: Gauge,
    pub drain_duration_seconds: Histogram,
    pub abi_cache_hits: IntCounter,
    pub abi_cache_misses: IntCounter,
    pub documents_indexed: IntCounterVec,
    pub store_errors: IntCounter,
    pub http_responses: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let queue_depth = GaugeVec::new(
            Opts::new("indexer_queue_depth", "Current length of each ingestion queue"),
            &["stream"],
        )
        .expect("metric construction");

        let producer_sleep_ms = Gauge::new(
            "indexer_producer_adaptive_sleep_milliseconds",
            "Current adaptive sleep applied by the producer thread",
        )
        .expect("metric construction");

        let drain_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "indexer_drain_duration_seconds",
                "Wall-clock time spent processing one stream's drained buffer",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )
        .expect("metric construction");

        let abi_cache_hits = IntCounter::new("indexer_abi_cache_hits_total", "ABI cache hits")
            .expect("metric construction");
        let abi_cache_misses =
            IntCounter::new("indexer_abi_cache_misses_total", "ABI cache misses").expect("metric construction");

        let documents_indexed = IntCounterVec::new(
            Opts::new("indexer_documents_indexed_total", "Documents written to the store"),
            &["kind"],
        )
        .expect("metric construction");

        let store_errors = IntCounter::new("indexer_store_errors_total", "Document store operation failures")
            .expect("metric construction");

        let http_responses = IntCounterVec::new(
            Opts::new("indexer_http_responses_total", "Blacklist HTTP surface responses by status code"),
            &["status"],
        )
        .expect("metric construction");

        registry.register(Box::new(queue_depth.clone())).expect("metric registration");
        registry.register(Box::new(producer_sleep_ms.clone())).expect("metric registration");
        registry.register(Box::new(drain_duration_seconds.clone())).expect("metric registration");
        registry.register(Box::new(abi_cache_hits.clone())).expect("metric registration");
        registry.register(Box::new(abi_cache_misses.clone())).expect("metric registration");
        registry.register(Box::new(documents_indexed.clone())).expect("metric registration");
        registry.register(Box::new(store_errors.clone())).expect("metric registration");
        registry.register(Box::new(http_responses.clone())).expect("metric registration");

        Self {
            registry,
            queue_depth,
            producer_sleep_ms,
            drain_duration_seconds,
            abi_cache_hits,
            abi_cache_misses,
            documents_indexed,
            store_errors,
            http_responses,
        }
    }

    /// Renders the registry in Prometheus text exposition format.
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        encoder.encode(&families, &mut buffer).expect("metric encoding");
        String::from_utf8(buffer).expect("prometheus text format is valid utf-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
