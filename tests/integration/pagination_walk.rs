//! Walking a cursor-paginated endpoint end to end.

use crate::integration::test_utils::{client_over, transactions, FailingTransport, MemoryVm};
use cursorpage::client::CURSOR_PAGINATION_FLAG;
use cursorpage::error::ApiError;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn block_positions(results: &[Value]) -> Vec<(u64, u64)> {
    results
        .iter()
        .map(|tx| {
            (
                tx["block_number"].as_str().unwrap().parse().unwrap(),
                tx["transaction_index"].as_str().unwrap().parse().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_walk_collects_every_record_once_in_order() {
    let vm = Arc::new(MemoryVm::new(transactions(100)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let results = client
        .fetch_all("transactions", &params(json!({"max_results": 10})), None)
        .await
        .unwrap();

    assert_eq!(results.len(), 100);
    assert_eq!(vm.request_count("transactions"), 10);

    let positions = block_positions(&results);
    let mut expected = positions.clone();
    expected.sort_by(|a, b| b.cmp(a));
    expected.dedup();
    assert_eq!(positions, expected, "newest first, no duplicates");
}

#[tokio::test]
async fn test_walk_follows_page_keys_and_flags_cursor_mode() {
    let vm = Arc::new(MemoryVm::new(transactions(30)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    client
        .fetch_all(
            "transactions",
            &params(json!({"sort_by": "oldest_first", "max_results": 10})),
            None,
        )
        .await
        .unwrap();

    let requests = vm.requests();
    assert_eq!(requests.len(), 3);
    for (_, query) in &requests {
        assert!(query.contains(&(CURSOR_PAGINATION_FLAG.to_string(), "true".to_string())));
    }

    let page_keys: Vec<Option<&str>> = requests
        .iter()
        .map(|(_, query)| {
            query
                .iter()
                .find(|(name, _)| name == "page_key")
                .map(|(_, value)| value.as_str())
        })
        .collect();
    assert_eq!(page_keys, vec![None, Some("19000003-0"), Some("19000006-1")]);
}

#[tokio::test]
async fn test_walk_applies_filters_on_every_page() {
    let vm = Arc::new(MemoryVm::new(transactions(60)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let results = client
        .fetch_all(
            "transactions",
            &params(json!({"status": ["0"], "max_results": 5})),
            None,
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 12);
    assert!(results.iter().all(|tx| tx["status"] == json!("0")));
}

#[tokio::test]
async fn test_cap_stops_after_the_page_that_reaches_it() {
    let vm = Arc::new(MemoryVm::new(transactions(100)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let results = client
        .fetch_all("transactions", &params(json!({"max_results": 10})), Some(25))
        .await
        .unwrap();

    // Whole pages are kept, so the cap may be overshot.
    assert_eq!(results.len(), 30);
    assert_eq!(vm.request_count("transactions"), 3);
}

#[tokio::test]
async fn test_reverse_walk_is_the_mirror_image() {
    let vm = Arc::new(MemoryVm::new(transactions(40)));
    let client = client_over(vm, Duration::from_secs(5), None);

    let forward = client
        .fetch_all("transactions", &params(json!({"max_results": 7})), None)
        .await
        .unwrap();
    let backward = client
        .fetch_all(
            "transactions",
            &params(json!({"max_results": 7, "reverse": true})),
            None,
        )
        .await
        .unwrap();

    let mut mirrored = backward.clone();
    mirrored.reverse();
    assert_eq!(forward, mirrored);
}

#[tokio::test]
async fn test_numbers_arrive_as_exact_strings() {
    let vm = Arc::new(MemoryVm::new(transactions(1)));
    let client = client_over(vm, Duration::from_secs(5), None);

    let results = client
        .fetch_all("transactions", &Map::new(), None)
        .await
        .unwrap();
    assert_eq!(results[0]["value"], json!("1000000000000000000000"));
}

#[tokio::test]
async fn test_empty_collection_is_one_request() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let results = client.fetch_all("transactions", &Map::new(), None).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(vm.request_count("transactions"), 1);
}

#[tokio::test]
async fn test_missing_page_key_stops_the_walk() {
    let vm = Arc::new(MemoryVm::new(transactions(50)).dropping_page_key_after(1));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let results = client
        .fetch_all("transactions", &params(json!({"max_results": 10})), None)
        .await
        .unwrap();

    assert_eq!(results.len(), 20);
    assert_eq!(vm.request_count("transactions"), 2);
}

#[tokio::test]
async fn test_error_body_fails_the_walk() {
    let vm = Arc::new(MemoryVm::new(transactions(5)));
    let client = client_over(vm, Duration::from_secs(5), None);

    let result = client.fetch_all("nowhere", &Map::new(), None).await;
    assert!(matches!(result, Err(ApiError::Remote(message)) if message.contains("nowhere")));
}

#[tokio::test]
async fn test_malformed_page_fails_the_walk() {
    let vm = Arc::new(MemoryVm::new(transactions(5)));
    let client = client_over(vm, Duration::from_secs(5), None);

    let result = client.fetch_all("broken", &Map::new(), None).await;
    assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_server_failure_fails_the_walk() {
    let client = client_over(Arc::new(FailingTransport { status: 503 }), Duration::from_secs(5), None);

    let result = client.fetch_all("transactions", &Map::new(), None).await;
    assert!(matches!(result, Err(ApiError::ServerError { status: 503, .. })));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let vm = Arc::new(MemoryVm::new(transactions(5)));
    let client = client_over(vm, Duration::from_millis(50), None);

    let result = client
        .fetch_all("contracts/0xaa/static-call/slow", &Map::new(), None)
        .await;
    match result {
        Err(ApiError::Unresponsive { timeout }) => assert_eq!(timeout, Duration::from_millis(50)),
        other => panic!("expected timeout, got {:?}", other),
    }
}
