//! HTTP-level behavior of `DocumentStoreClient` against a wiremock fake:
//! index lifecycle idempotence, response-code/transport/bulk failure
//! mapping.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use es_document_store::{DocumentStoreClient, StoreError};
use shared_types::DocumentKind;

async fn client_for(server: &MockServer) -> DocumentStoreClient {
    DocumentStoreClient::new(vec![server.uri()], "chain")
}

#[tokio::test]
async fn create_index_then_delete_index_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/chain"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/chain"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    tokio::task::spawn_blocking(move || {
        client.create_index(&json!({"mappings": {}})).unwrap();
        client.delete_index().unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn delete_index_on_an_absent_index_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chain"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = tokio::task::spawn_blocking(move || client.delete_index()).await.unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn delete_index_surfaces_non_404_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/chain"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = tokio::task::spawn_blocking(move || client.delete_index()).await.unwrap();
    match result {
        Err(StoreError::ResponseCode { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal error");
        }
        other => panic!("expected ResponseCode error, got {other:?}"),
    }
}

#[tokio::test]
async fn index_request_reaches_the_kind_specific_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chain/blocks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    tokio::task::spawn_blocking(move || {
        client
            .index(DocumentKind::Blocks, &json!({"block_num": 1}), None)
            .unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn index_with_explicit_id_addresses_that_document() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chain/accounts/eosio"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    tokio::task::spawn_blocking(move || {
        client
            .index(DocumentKind::Accounts, &json!({"abi": null}), Some("eosio"))
            .unwrap();
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn count_reads_the_count_field_from_the_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chain/accounts/_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 42})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let count = tokio::task::spawn_blocking(move || client.count(DocumentKind::Accounts, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(count, 42);
}

#[tokio::test]
async fn count_rejects_a_response_missing_the_count_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chain/accounts/_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = tokio::task::spawn_blocking(move || client.count(DocumentKind::Accounts, None))
        .await
        .unwrap();
    assert!(matches!(result, Err(StoreError::Decode(_))));
}

#[tokio::test]
async fn every_configured_base_url_failing_reports_a_connection_error() {
    let client = DocumentStoreClient::new(vec!["http://127.0.0.1:1".to_string()], "chain");
    let result = tokio::task::spawn_blocking(move || client.create_index(&json!({}))).await.unwrap();
    assert!(matches!(result, Err(StoreError::Connection(_))));
}

#[tokio::test]
async fn bulk_reports_per_item_failures_instead_of_accepting_partial_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": true,
            "items": [
                {"index": {"status": 201}},
                {"index": {"status": 400, "error": {"type": "mapper_parsing_exception"}}},
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result = tokio::task::spawn_blocking(move || {
        client.bulk(&[
            es_document_store::BulkItem {
                kind: DocumentKind::Blocks,
                id: None,
                body: json!({"block_num": 1}),
            },
            es_document_store::BulkItem {
                kind: DocumentKind::Blocks,
                id: None,
                body: json!({"block_num": 2}),
            },
        ])
    })
    .await
    .unwrap();

    match result {
        Err(StoreError::BulkFail { failed_items, total_items }) => {
            assert_eq!(failed_items, 1);
            assert_eq!(total_items, 2);
        }
        other => panic!("expected BulkFail, got {other:?}"),
    }
}

#[tokio::test]
async fn bulk_with_an_empty_batch_sends_no_request() {
    let server = MockServer::start().await;
    // No mock mounted for /_bulk: any request would fail to match and panic
    // wiremock's default "unmatched request" handling is silent 404, so
    // assert the result directly instead of depending on that.
    let client = client_for(&server).await;
    let result = tokio::task::spawn_blocking(move || client.bulk(&[])).await.unwrap();
    assert!(result.is_ok());
}
