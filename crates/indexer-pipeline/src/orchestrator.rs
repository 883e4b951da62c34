//! The pipeline orchestrator: owns the lifecycle, the four controller
//! subscriptions, and the consumer thread that drains the bounded queues
//! and drives the per-stream processors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use abi_cache::AbiCache;
use es_document_store::{DocumentStoreClient, StoreError};
use obs_telemetry::Metrics;
use shared_bus::BoundedStreamQueues;
use shared_types::{ActionTrace, BlockStateEvent, DocumentKind, IrreversibleBlockEvent, TransactionMetadataEvent, TransactionTraceEvent};
use variant_encoder::VariantEncoder;

use crate::config::PipelineConfig;
use crate::controller_port::{ControllerSignals, SubscriptionHandle};
use crate::lifecycle::LifecycleState;
use crate::processors;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Subscribes four callbacks on the controller, runs the single consumer
/// thread, and drives shutdown. Owns the ABI cache and the document store
/// client — both are consumer-thread-exclusive.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    queues: Arc<BoundedStreamQueues>,
    store: Arc<DocumentStoreClient>,
    metrics: Arc<Metrics>,
    state: LifecycleState,
    subscriptions: Vec<SubscriptionHandle>,
    consumer_handle: Option<JoinHandle<()>>,
    start_block_reached: Arc<AtomicBool>,
}

impl PipelineOrchestrator {
    /// Configures the queue/cache bounds, optionally drops and always
    /// (re)creates the index with the given (opaque) mapping resource,
    /// seeds the `accounts` kind with a bootstrap document for the system
    /// account if empty, and registers the four controller subscriptions.
    /// Does not yet launch the consumer thread — that's [`Self::start`].
    pub fn initialize(
        config: PipelineConfig,
        controller: &impl ControllerSignals,
        store: Arc<DocumentStoreClient>,
        metrics: Arc<Metrics>,
        mappings: &Value,
    ) -> Result<Self, PipelineError> {
        if config.delete_index_on_startup {
            store.delete_index()?;
        }
        store.create_index(mappings)?;

        if store.count(DocumentKind::Accounts, None)? == 0 {
            let seed = processors::build_account_abi_document(&config.system_account, Value::Null, now_millis());
            store.index(DocumentKind::Accounts, &seed.body, seed.id.as_deref())?;
        }

        let queues = Arc::new(BoundedStreamQueues::new(config.max_queue_size));

        let mut subscriptions = Vec::with_capacity(4);

        let q = queues.clone();
        subscriptions.push(controller.subscribe_accepted_block(Arc::new(move |event: Arc<BlockStateEvent>| {
            q.enqueue_accepted_block(event);
        })));

        let q = queues.clone();
        subscriptions.push(controller.subscribe_irreversible_block(Arc::new(move |event: Arc<IrreversibleBlockEvent>| {
            q.enqueue_irreversible_block(event);
        })));

        let q = queues.clone();
        subscriptions.push(controller.subscribe_accepted_transaction(Arc::new(
            move |event: Arc<TransactionMetadataEvent>| {
                q.enqueue_accepted_transaction(event);
            },
        )));

        let q = queues.clone();
        subscriptions.push(controller.subscribe_applied_transaction_trace(Arc::new(
            move |event: Arc<TransactionTraceEvent>| {
                q.enqueue_trace(event);
            },
        )));

        Ok(Self {
            config,
            queues,
            store,
            metrics,
            state: LifecycleState::Initialized,
            subscriptions,
            consumer_handle: None,
            start_block_reached: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The `start_block_reached` flag, for metrics/tests. Monotonic once
    /// tripped: never flips back to `false`.
    pub fn start_block_reached(&self) -> bool {
        self.start_block_reached.load(Ordering::Relaxed)
    }

    /// Launches the consumer thread. Idempotent no-op if already started.
    pub fn start(&mut self) {
        if self.state != LifecycleState::Initialized {
            return;
        }
        let queues = self.queues.clone();
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        let config = self.config.clone();
        let start_block_reached = self.start_block_reached.clone();

        self.consumer_handle = Some(thread::spawn(move || {
            consumer_loop(queues, store, metrics, config, start_block_reached);
        }));
        self.state = LifecycleState::Started;
    }

    /// Requests shutdown, joins the consumer thread (skipped if it was
    /// never started), and releases all four subscriptions in order.
    pub fn shutdown(&mut self) {
        if self.state == LifecycleState::Stopped {
            return;
        }
        if self.state.consumer_running() {
            self.state = LifecycleState::Draining;
        }
        self.queues.shutdown();
        if let Some(handle) = self.consumer_handle.take() {
            if handle.join().is_err() {
                warn!("indexer consumer thread panicked during shutdown");
            }
        }
        for subscription in self.subscriptions.drain(..) {
            subscription.release();
        }
        self.state = LifecycleState::Stopped;
    }

    pub fn queues(&self) -> &Arc<BoundedStreamQueues> {
        &self.queues
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}

impl Drop for PipelineOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn consumer_loop(
    queues: Arc<BoundedStreamQueues>,
    store: Arc<DocumentStoreClient>,
    metrics: Arc<Metrics>,
    config: PipelineConfig,
    start_block_reached: Arc<AtomicBool>,
) {
    let mut cache = AbiCache::new(config.abi_cache_size);
    let encoder = VariantEncoder::with_time_budget(config.system_account.clone(), config.deserializer_time_budget);
    let mut cache_hits_seen = 0u64;
    let mut cache_misses_seen = 0u64;

    while let Some(buffers) = queues.wait_and_drain() {
        process_stream(&metrics, "traces", buffers.traces.len(), config.slow_drain_threshold, || {
            for trace in &buffers.traces {
                if !start_block_reached.load(Ordering::Relaxed) {
                    continue;
                }
                if let Err(e) = process_applied_transaction_trace(trace, &mut cache, &encoder, &store, &metrics) {
                    metrics.store_errors.inc();
                    warn!(trx_id = %trace.trx_id, error = %e, "failed to index transaction trace");
                }
            }
        });

        let hits_now = cache.hits();
        let misses_now = cache.misses();
        metrics.abi_cache_hits.inc_by(hits_now - cache_hits_seen);
        metrics.abi_cache_misses.inc_by(misses_now - cache_misses_seen);
        cache_hits_seen = hits_now;
        cache_misses_seen = misses_now;

        process_stream(
            &metrics,
            "accepted_transactions",
            buffers.accepted_transactions.len(),
            config.slow_drain_threshold,
            || {
                for tx in &buffers.accepted_transactions {
                    if !start_block_reached.load(Ordering::Relaxed) {
                        continue;
                    }
                    if let Err(e) = process_accepted_transaction(tx, &encoder, &store, &metrics) {
                        metrics.store_errors.inc();
                        warn!(trx_id = %tx.trx_id, error = %e, "failed to index accepted transaction");
                    }
                }
            },
        );

        process_stream(
            &metrics,
            "accepted_blocks",
            buffers.accepted_blocks.len(),
            config.slow_drain_threshold,
            || {
                for block in &buffers.accepted_blocks {
                    if !start_block_reached.load(Ordering::Relaxed) {
                        if block.block_num < config.start_block_num {
                            continue;
                        }
                        start_block_reached.store(true, Ordering::Relaxed);
                    }
                    if let Err(e) = process_accepted_block(block, &encoder, &store, &metrics) {
                        metrics.store_errors.inc();
                        warn!(block_num = block.block_num, error = %e, "failed to index accepted block");
                    }
                }
            },
        );

        process_stream(
            &metrics,
            "irreversible_blocks",
            buffers.irreversible_blocks.len(),
            config.slow_drain_threshold,
            || {
                for block in &buffers.irreversible_blocks {
                    if !start_block_reached.load(Ordering::Relaxed) {
                        continue;
                    }
                    if let Err(e) = process_irreversible_block(block, &encoder, &store, &metrics) {
                        metrics.store_errors.inc();
                        warn!(block_num = block.block_num, error = %e, "failed to index irreversible block");
                    }
                }
            },
        );
    }
}

/// Wraps one stream's processing with the >500ms slow-drain log (spec
/// §4.F: "for each stream, measure wall-clock duration") and records the
/// drain duration histogram regardless of whether it crossed the
/// threshold.
fn process_stream(metrics: &Metrics, name: &str, count: usize, threshold: Duration, work: impl FnOnce()) {
    if count == 0 {
        return;
    }
    let started = Instant::now();
    work();
    let elapsed = started.elapsed();
    metrics.drain_duration_seconds.observe(elapsed.as_secs_f64());
    if elapsed > threshold {
        info!(
            stream = name,
            count,
            total_ms = elapsed.as_millis() as u64,
            per_item_ms = (elapsed.as_millis() as f64) / (count as f64),
            "slow drain cycle"
        );
    }
}

fn record_indexed(metrics: &Metrics, kind: DocumentKind) {
    metrics.documents_indexed.with_label_values(&[kind.as_str()]).inc();
}

fn process_accepted_block(
    event: &BlockStateEvent,
    encoder: &VariantEncoder,
    store: &DocumentStoreClient,
    metrics: &Metrics,
) -> Result<(), StoreError> {
    let now = now_millis();
    let header_state = encoder.encode_opaque(&event.block_header_state);
    let block_states_doc = processors::build_block_states_document(event, header_state, now);
    store.index(block_states_doc.kind, &block_states_doc.body, block_states_doc.id.as_deref())?;
    record_indexed(metrics, block_states_doc.kind);

    let block_value = encoder.encode_opaque(&event.block.raw);
    let blocks_doc = processors::build_blocks_document(event, block_value, now);
    store.index(blocks_doc.kind, &blocks_doc.body, blocks_doc.id.as_deref())?;
    record_indexed(metrics, blocks_doc.kind);
    Ok(())
}

fn process_irreversible_block(
    event: &IrreversibleBlockEvent,
    encoder: &VariantEncoder,
    store: &DocumentStoreClient,
    metrics: &Metrics,
) -> Result<(), StoreError> {
    let now = now_millis();
    let (query, script) = processors::irreversible_update_by_query(&event.block_id.to_hex());
    store.update_by_query(DocumentKind::Blocks, &query, &script)?;

    let header_state = encoder.encode_opaque(&event.block_header_state);
    let doc = processors::build_finalized_block_states_document(event, header_state, now);
    store.index(doc.kind, &doc.body, doc.id.as_deref())?;
    record_indexed(metrics, doc.kind);
    Ok(())
}

fn process_accepted_transaction(
    event: &TransactionMetadataEvent,
    encoder: &VariantEncoder,
    store: &DocumentStoreClient,
    metrics: &Metrics,
) -> Result<(), StoreError> {
    let now = now_millis();
    let trx_value = encoder.encode_opaque(&event.trx);
    let doc = processors::build_transaction_document(event, trx_value, now);
    store.index(doc.kind, &doc.body, doc.id.as_deref())?;
    record_indexed(metrics, doc.kind);
    Ok(())
}

fn process_applied_transaction_trace(
    event: &TransactionTraceEvent,
    cache: &mut AbiCache,
    encoder: &VariantEncoder,
    store: &DocumentStoreClient,
    metrics: &Metrics,
) -> Result<(), StoreError> {
    let now = now_millis();
    let mut encoded_traces = Vec::with_capacity(event.action_traces.len());

    for (index, trace) in event.action_traces.iter().enumerate() {
        let data = encode_action_trace_data(trace, cache, encoder, store, now);

        encoded_traces.push(serde_json::json!({
            "account": trace.account.as_str(),
            "action_name": trace.action_name,
            "data": data.clone(),
        }));

        let action_doc = processors::build_action_document(&event.trx_id, index, trace, data.clone(), now);
        store.index(action_doc.kind, &action_doc.body, action_doc.id.as_deref())?;
        record_indexed(metrics, action_doc.kind);

        if trace.is_setabi {
            let account_doc = processors::build_account_abi_document(trace.account.as_str(), data, now);
            store.index(account_doc.kind, &account_doc.body, account_doc.id.as_deref())?;
            record_indexed(metrics, account_doc.kind);
        }
    }

    let receipts = encoder.encode_opaque(&event.receipts);
    let trace_doc =
        processors::build_transaction_trace_document(event, Value::Array(encoded_traces), receipts, now);
    store.index(trace_doc.kind, &trace_doc.body, trace_doc.id.as_deref())?;
    record_indexed(metrics, trace_doc.kind);
    Ok(())
}

/// `setabi` carries its own abi bytes directly in `data`: the system
/// account's `setabi.abi` is rewritten to structured form; every other
/// account's stays opaque here and is decoded later, on demand, by the
/// ABI cache the next time that account's actions need resolving.
/// Every other action resolves through the cache in the ordinary way.
fn encode_action_trace_data(
    trace: &ActionTrace,
    cache: &mut AbiCache,
    encoder: &VariantEncoder,
    store: &DocumentStoreClient,
    now: u64,
) -> Value {
    if trace.is_setabi {
        return encoder.encode_setabi_abi(&trace.account, &trace.data);
    }
    encoder.encode_action_data(cache, now, store, &trace.account, &trace.action_name, &trace.data)
}
