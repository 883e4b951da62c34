//! Orchestrator configuration: everything set at `Uninitialized ->
//! Initialized`.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// `elastic-queue-size` / *max_queue_size*.
    pub max_queue_size: usize,
    /// `elastic-abi-cache-size` / *abi_cache_size*.
    pub abi_cache_size: usize,
    /// `elastic-start-block` / *start_block_num*.
    pub start_block_num: u32,
    /// `elastic-index-name`.
    pub index_name: String,
    /// `elastic-urls`, at least one required.
    pub backend_urls: Vec<String>,
    /// `elastic-delete-index-on-startup`.
    pub delete_index_on_startup: bool,
    /// The account name whose `setabi.abi` is decoded to structured form
    /// rather than left opaque.
    pub system_account: String,
    /// Soft budget for how long one drain cycle's processing is allowed to
    /// take before it's logged as slow (>500ms emits an info log per
    /// stream).
    pub slow_drain_threshold: Duration,
    /// Per-action-data-decode deserializer time budget, set at orchestrator
    /// initialization alongside the queue and cache bounds. Exceeding it
    /// aborts that one decode in favor of the opaque fallback rather than
    /// stalling the consumer thread on a pathological ABI.
    pub deserializer_time_budget: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10_000,
            abi_cache_size: 2_048,
            start_block_num: 0,
            index_name: "chain".to_string(),
            backend_urls: Vec::new(),
            delete_index_on_startup: false,
            system_account: "eosio".to_string(),
            slow_drain_threshold: Duration::from_millis(500),
            deserializer_time_budget: variant_encoder::DEFAULT_DESERIALIZER_TIME_BUDGET,
        }
    }
}
