//! End-to-end exercise of the bounded queues, the consumer thread, and the
//! document store client together: 2048 accepted-block events against a
//! 1024-sized queue. The store is a wiremock fake so this test needs no
//! live Elasticsearch.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use indexer_pipeline::config::PipelineConfig;
use indexer_pipeline::controller_port::fakes::FakeController;
use indexer_pipeline::orchestrator::PipelineOrchestrator;
use shared_types::{BlockId, BlockPayload, BlockStateEvent, OpaquePayload};

fn sample_block(block_num: u32) -> Arc<BlockStateEvent> {
    Arc::new(BlockStateEvent {
        block_num,
        block_id: BlockId(block_num.to_le_bytes().to_vec()),
        validated: true,
        in_current_chain: true,
        block_header_state: OpaquePayload(vec![1, 2, 3]),
        block: BlockPayload {
            raw: OpaquePayload(vec![4, 5, 6]),
            transaction_ids: vec![],
        },
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sustained_load_drains_every_event_without_dropping() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/chain"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chain/accounts/_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chain/block_states"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chain/blocks"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = PipelineConfig {
        max_queue_size: 1024,
        abi_cache_size: 64,
        start_block_num: 0,
        index_name: "chain".to_string(),
        backend_urls: vec![server.uri()],
        delete_index_on_startup: false,
        system_account: "eosio".to_string(),
        slow_drain_threshold: Duration::from_millis(500),
        deserializer_time_budget: variant_encoder::DEFAULT_DESERIALIZER_TIME_BUDGET,
    };

    let controller = Arc::new(FakeController::default());

    let mut orchestrator = tokio::task::spawn_blocking({
        let controller = controller.clone();
        move || {
            let store_client = Arc::new(es_document_store::DocumentStoreClient::new(
                config.backend_urls.clone(),
                config.index_name.clone(),
            ));
            PipelineOrchestrator::initialize(
                config,
                &controller,
                store_client,
                Arc::new(obs_telemetry::Metrics::new()),
                &json!({"mappings": {}}),
            )
            .unwrap()
        }
    })
    .await
    .unwrap();

    orchestrator.start();

    const TOTAL: u32 = 2048;
    tokio::task::spawn_blocking({
        let controller = controller.clone();
        move || {
            for n in 0..TOTAL {
                controller.fire_accepted_block(sample_block(n));
            }
        }
    })
    .await
    .unwrap();

    // Give the consumer thread time to drain; poll rather than sleep a
    // fixed amount since drain timing depends on the host machine.
    let queues = orchestrator.queues().clone();
    for _ in 0..200 {
        if queues.queue_depths().accepted_blocks == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    tokio::task::spawn_blocking(move || orchestrator.shutdown()).await.unwrap();

    let received = server
        .received_requests()
        .await
        .expect("mock server should record requests");
    let block_states_writes = received.iter().filter(|r| r.url.path() == "/chain/block_states").count();
    assert_eq!(block_states_writes, TOTAL as usize);
}
