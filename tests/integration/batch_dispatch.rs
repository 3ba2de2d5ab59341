//! Concurrent static-call batches and the point endpoints around them.

use crate::integration::test_utils::{client_over, transactions, FixedTransport, MemoryVm};
use cursorpage::client::StaticCall;
use cursorpage::error::ApiError;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn call(function: &str, args: Value) -> StaticCall {
    StaticCall::new("0x00000000000000000000000000000000000000aa", function, args)
}

#[tokio::test]
async fn test_results_follow_request_order() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm, Duration::from_secs(5), None);

    let calls: Vec<StaticCall> = (0..8)
        .map(|i| call(&format!("f{}", i), json!({ "i": i })))
        .collect();
    let results = client.batch_call(&calls).await.unwrap();

    assert_eq!(results.len(), 8);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["function"], json!(format!("f{}", i)));
        assert_eq!(result["args"], json!({ "i": i.to_string() }));
    }
}

#[tokio::test]
async fn test_empty_batch_makes_no_requests() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    assert!(client.batch_call(&[]).await.unwrap().is_empty());
    assert!(vm.requests().is_empty());
}

#[tokio::test]
async fn test_unbounded_batch_runs_concurrently() {
    let vm = Arc::new(MemoryVm::new(Vec::new()).with_delay(Duration::from_millis(100)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let calls: Vec<StaticCall> = (0..10).map(|i| call("balanceOf", json!([i]))).collect();
    let started = Instant::now();
    client.batch_call(&calls).await.unwrap();

    assert_eq!(vm.peak_in_flight(), 10);
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_bounded_batch_respects_max_in_flight() {
    let vm = Arc::new(MemoryVm::new(Vec::new()).with_delay(Duration::from_millis(20)));
    let client = client_over(vm.clone(), Duration::from_secs(5), Some(3));

    let calls: Vec<StaticCall> = (0..12).map(|i| call(&format!("f{}", i), json!(null))).collect();
    let results = client.batch_call(&calls).await.unwrap();

    assert_eq!(vm.peak_in_flight(), 3);
    let functions: Vec<&str> = results
        .iter()
        .map(|r| r["function"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (0..12).map(|i| format!("f{}", i)).collect();
    assert_eq!(functions, expected);
}

#[tokio::test]
async fn test_one_failure_fails_the_batch_with_its_error() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm, Duration::from_secs(5), None);

    let calls = vec![
        call("name", json!(null)),
        call("symbol", json!(null)),
        call("fail", json!({ "amount": 5 })),
        call("decimals", json!(null)),
        call("totalSupply", json!(null)),
    ];

    match client.batch_call(&calls).await {
        Err(ApiError::StaticCall(message)) => {
            assert_eq!(message, r#"execution reverted: {"amount":"5"}"#);
        }
        other => panic!("expected static call error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_inside_batch_is_a_static_call_error() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm, Duration::from_millis(50), Some(2));

    let calls = vec![call("name", json!(null)), call("slow", json!(null))];
    let started = Instant::now();
    let result = client.batch_call(&calls).await;

    assert!(matches!(result, Err(ApiError::StaticCall(message)) if message.contains("Not responsive")));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_bounded_batch_reports_first_failure_to_complete() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm, Duration::from_secs(2), Some(2));

    let calls = vec![call("slow", json!(null)), call("fail", json!({ "amount": 5 }))];
    let started = Instant::now();
    let result = client.batch_call(&calls).await;

    match result {
        Err(ApiError::StaticCall(message)) => assert!(message.starts_with("execution reverted"), "{}", message),
        other => panic!("expected the revert, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_static_call_canonicalizes_arguments() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let args: Value =
        serde_json::from_str(r#"{"amount": 1.50, "big": 123456789012345678901234567890, "tiny": 1e-3}"#)
            .unwrap();
    let result = client.static_call(&call("quote", args)).await.unwrap();

    assert_eq!(
        result["args"],
        json!({"amount": "1.5", "big": "123456789012345678901234567890", "tiny": "0.001"})
    );
    let (_, query) = &vm.requests()[0];
    assert_eq!(query[0].0, "args");
    assert!(query[0].1.contains(r#""big":"123456789012345678901234567890""#));
}

#[tokio::test]
async fn test_get_transaction() {
    let records = transactions(3);
    let hash = records[1].transaction_hash.clone();
    let vm = Arc::new(MemoryVm::new(records));
    let client = client_over(vm, Duration::from_secs(5), None);

    let tx = client.get_transaction(&hash).await.unwrap();
    assert_eq!(tx["transaction_hash"], json!(hash));

    let missing = client.get_transaction("0xdead").await;
    assert!(matches!(missing, Err(ApiError::Remote(message)) if message == "Transaction not found"));
}

#[tokio::test]
async fn test_status_and_cached_block_number() {
    let vm = Arc::new(MemoryVm::new(transactions(4)));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let status = client.get_status().await.unwrap();
    assert_eq!(status["current_block_number"], 19_000_001);
    assert_eq!(status["transaction_count"], 4);

    let first = client.cached_current_block_number().await.unwrap();
    let second = client.cached_current_block_number().await.unwrap();
    assert_eq!(first, 19_000_002);
    assert_eq!(first, second);
    assert_eq!(vm.status_calls(), 2);
}

#[tokio::test]
async fn test_status_rejects_block_number_out_of_range() {
    for block_number in [json!("18446744073709551616"), json!(-1)] {
        let body = json!({ "current_block_number": block_number, "transaction_count": 4 });
        let client = client_over(Arc::new(FixedTransport { body }), Duration::from_secs(5), None);

        assert!(matches!(client.get_status().await, Err(ApiError::MalformedResponse(_))));
        assert!(matches!(
            client.cached_current_block_number().await,
            Err(ApiError::MalformedResponse(_))
        ));
    }
}

#[tokio::test]
async fn test_historical_token_state_sends_flattened_params() {
    let vm = Arc::new(MemoryVm::new(Vec::new()));
    let client = client_over(vm.clone(), Duration::from_secs(5), None);

    let params: Map<String, Value> =
        serde_json::from_str(r#"{"block_number": 19000000, "token_ids": [1, 2]}"#).unwrap();
    let result = client.get_historical_token_state("0xaa", &params).await;

    // No such route in the in-memory VM; the request shape is what matters here.
    assert!(matches!(result, Err(ApiError::Remote(_))));
    let (path, query) = &vm.requests()[0];
    assert_eq!(path, "tokens/0xaa/historical_token_state");
    assert_eq!(
        query,
        &vec![
            ("block_number".to_string(), "19000000".to_string()),
            ("token_ids[]".to_string(), "1".to_string()),
            ("token_ids[]".to_string(), "2".to_string()),
        ]
    );
}
