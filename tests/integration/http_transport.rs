//! HttpTransport against a minimal local HTTP stub.

use cursorpage::client::{ClientConfig, HttpTransport, StaticCall, Transport, VmClient};
use cursorpage::error::ApiError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serve every connection with the same canned response; the raw request heads
/// are sent back through the returned channel.
async fn stub_server(
    status_line: &'static str,
    body: &'static str,
    delay: Duration,
) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/api", addr), rx)
}

#[tokio::test]
async fn test_get_sends_query_and_bearer_token() {
    let (base_url, mut heads) = stub_server("200 OK", r#"{"result": 1}"#, Duration::ZERO).await;
    let transport =
        HttpTransport::new(&base_url, Some("s3cret".to_string()), Duration::from_secs(5)).unwrap();

    let body = transport
        .get("status", &[("page_key".to_string(), "5-0".to_string())])
        .await
        .unwrap();
    assert_eq!(body, json!({"result": 1}));

    let head = heads.recv().await.unwrap();
    assert!(head.starts_with("GET /api/status?page_key=5-0 HTTP/1.1"), "{}", head);
    assert!(head.to_ascii_lowercase().contains("authorization: bearer s3cret"));
}

#[tokio::test]
async fn test_server_error_status() {
    let (base_url, _heads) =
        stub_server("503 Service Unavailable", "overloaded", Duration::ZERO).await;
    let transport = HttpTransport::new(&base_url, None, Duration::from_secs(5)).unwrap();

    match transport.get("status", &[]).await {
        Err(ApiError::ServerError { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_error_with_json_body_is_returned() {
    let (base_url, _heads) =
        stub_server("404 Not Found", r#"{"error": "Transaction not found"}"#, Duration::ZERO).await;
    let transport = HttpTransport::new(&base_url, None, Duration::from_secs(5)).unwrap();

    let body = transport.get("transactions/0x1", &[]).await.unwrap();
    assert_eq!(body["error"], json!("Transaction not found"));
}

#[tokio::test]
async fn test_invalid_json_on_success_is_malformed() {
    let (base_url, _heads) = stub_server("200 OK", "<html>", Duration::ZERO).await;
    let transport = HttpTransport::new(&base_url, None, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        transport.get("status", &[]).await,
        Err(ApiError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_static_call_over_http_times_out() {
    let (base_url, _heads) = stub_server("200 OK", r#"{"result": 1}"#, Duration::from_secs(10)).await;
    let config = ClientConfig {
        base_url: Some(base_url),
        timeout_ms: 100,
        ..ClientConfig::default()
    };
    let client = VmClient::new(&config).unwrap();

    let result = client
        .static_call(&StaticCall::new("0xaa", "name", json!(null)))
        .await;
    assert!(matches!(result, Err(ApiError::StaticCall(message)) if message.contains("Not responsive")));
}

#[tokio::test]
async fn test_client_over_http_transport() {
    let (base_url, _heads) = stub_server(
        "200 OK",
        r#"{"result": [{"n": 1}], "pagination": {"page_key": null, "has_more": false}}"#,
        Duration::ZERO,
    )
    .await;
    let transport = HttpTransport::new(&base_url, None, Duration::from_secs(5)).unwrap();
    let config = ClientConfig {
        base_url: Some(base_url),
        ..ClientConfig::default()
    };
    let client = VmClient::with_transport(Arc::new(transport), &config);

    let results = client
        .fetch_all("transactions", &serde_json::Map::new(), None)
        .await
        .unwrap();
    assert_eq!(results, vec![json!({"n": 1})]);
}
