//! Process wiring: loads configuration, installs telemetry, constructs
//! every subsystem's collaborators, starts the pipeline's consumer thread
//! and the blacklist HTTP surface, and runs until shut down.
//!
//! Both subsystems are blocking, single-thread collaborators by design —
//! the document store client and chain table reader are never shared
//! across the producer/consumer boundary — so their construction and the
//! orchestrator's `initialize`/`start` calls run inside `spawn_blocking`
//! even though the surrounding binary is async end to end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{info, warn};

use blacklist_api::{router, warn_if_not_loopback};
use blacklist_crypto::{parse_signature_provider, SignatureProviderOutcome};
use blacklist_reconciler::{BlacklistReconciler, ReconcilerConfig};
use es_document_store::DocumentStoreClient;
use indexer_pipeline::{PipelineConfig, PipelineOrchestrator};
use obs_telemetry::{init_tracing, Metrics};

use crate::adapters::{ControllerBridge, HttpChainTableClient};
use crate::cli::Cli;
use crate::container::NodeConfig;

const INDEX_MAPPINGS: &str = include_str!("../resources/index_mappings.json");

/// Entry point called from `main`. Returns once the process receives
/// Ctrl+C and every subsystem has shut down cleanly.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = NodeConfig::load(&cli).context("loading node configuration")?;

    init_tracing(&config.telemetry.log_level).context("installing tracing subscriber")?;
    info!("chain-indexer node starting up");

    if let Some(option) = &config.blacklist.signature_provider {
        match parse_signature_provider(option) {
            Ok(SignatureProviderOutcome::KeyInstalled(_)) => {
                info!("blacklist signing key installed from signature-provider option");
            }
            Ok(SignatureProviderOutcome::Rejected) => {
                warn!("blacklist-signature-provider rejected, continuing without a signing key");
            }
            Ok(SignatureProviderOutcome::Unrecognized) => {
                warn!("blacklist-signature-provider scheme unrecognized, continuing without a signing key");
            }
            Err(e) => {
                warn!(error = %e, "malformed blacklist-signature-provider option, continuing without a signing key");
            }
        }
    }

    let metrics = Arc::new(Metrics::new());

    let store = Arc::new(DocumentStoreClient::new(
        config.indexer.elastic_urls.clone(),
        config.indexer.elastic_index_name.clone(),
    ));

    let pipeline_config = PipelineConfig {
        max_queue_size: config.indexer.elastic_queue_size,
        abi_cache_size: config.indexer.elastic_abi_cache_size,
        start_block_num: config.indexer.elastic_start_block,
        index_name: config.indexer.elastic_index_name.clone(),
        backend_urls: config.indexer.elastic_urls.clone(),
        delete_index_on_startup: config.indexer.elastic_delete_index_on_startup,
        ..PipelineConfig::default()
    };

    // The controller bridge's `dispatch_*` methods are the seam a host
    // process calls into from its own signal-emitting thread; the
    // controller itself is out of this workspace's scope. Nothing in this
    // binary calls them on its own.
    let init_controller = ControllerBridge::new();
    let mappings: Value = serde_json::from_str(INDEX_MAPPINGS).context("parsing bundled index mappings")?;

    let init_store = store.clone();
    let init_metrics = metrics.clone();
    let mut orchestrator = tokio::task::spawn_blocking(move || {
        PipelineOrchestrator::initialize(pipeline_config, &init_controller, init_store, init_metrics, &mappings)
    })
    .await
    .context("pipeline initialization task panicked")?
    .context("initializing pipeline orchestrator")?;

    orchestrator.start();
    info!("ingestion pipeline consumer thread started");

    let chain_rpc_url = config
        .blacklist
        .chain_rpc_url
        .clone()
        .expect("validated non-empty at config load");
    let chain_table = HttpChainTableClient::new(chain_rpc_url);
    let reconciler_config = ReconcilerConfig {
        contract: config.blacklist.contract.clone(),
        permission: config.blacklist.permission.clone(),
        producer_name: config.blacklist.producer_name.clone(),
        local_accounts: config.blacklist.actor_blacklist.clone(),
        ..ReconcilerConfig::default()
    };
    let reconciler = Arc::new(BlacklistReconciler::new(reconciler_config, chain_table));

    let http_addr: SocketAddr = config.http_bind.parse().context("parsing http-bind address")?;
    warn_if_not_loopback(http_addr);
    let app = router(reconciler, metrics.clone());
    let listener = TcpListener::bind(http_addr).await.context("binding blacklist HTTP surface")?;
    info!(addr = %http_addr, "blacklist HTTP surface listening");
    let http_server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "blacklist HTTP surface exited");
        }
    });

    let metrics_task = if let Some(bind) = config.telemetry.metrics_bind.clone() {
        let addr: SocketAddr = bind.parse().context("parsing metrics-bind address")?;
        let listener = TcpListener::bind(addr).await.context("binding metrics endpoint")?;
        info!(addr = %addr, "metrics endpoint listening");
        let metrics_for_scrape = metrics.clone();
        let scrape_app = axum::Router::new().route(
            "/metrics",
            axum::routing::get(move || {
                let metrics = metrics_for_scrape.clone();
                async move { metrics.gather() }
            }),
        );
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, scrape_app).await {
                warn!(error = %e, "metrics endpoint exited");
            }
        }))
    } else {
        None
    };

    let gauge_queues = orchestrator.queues().clone();
    let gauge_metrics = metrics.clone();
    let gauge_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let depths = gauge_queues.queue_depths();
            gauge_metrics.queue_depth.with_label_values(&["traces"]).set(depths.traces as f64);
            gauge_metrics
                .queue_depth
                .with_label_values(&["accepted_transactions"])
                .set(depths.accepted_transactions as f64);
            gauge_metrics
                .queue_depth
                .with_label_values(&["accepted_blocks"])
                .set(depths.accepted_blocks as f64);
            gauge_metrics
                .queue_depth
                .with_label_values(&["irreversible_blocks"])
                .set(depths.irreversible_blocks as f64);
            gauge_metrics.producer_sleep_ms.set(gauge_queues.producer_sleep().as_millis() as f64);
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for shutdown signal")?;
    info!("shutdown signal received, draining pipeline");

    gauge_task.abort();
    http_server.abort();
    if let Some(task) = metrics_task {
        task.abort();
    }

    tokio::task::spawn_blocking(move || orchestrator.shutdown())
        .await
        .context("pipeline shutdown task panicked")?;

    info!("chain-indexer node shut down cleanly");
    Ok(())
}
