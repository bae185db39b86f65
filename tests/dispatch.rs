//! End-to-end dispatch tests against a local mock server.
//!
//! Everything here exercises the full path: builder, timeout race, the
//! reqwest transport, and decoding, with mockito standing in for the
//! remote API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mockito::Matcher;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use fluent_fetch::{
    Decoded, ErrorPayload, HeadersBuilder, Method, RequestBuilder,
};

#[derive(Debug, Deserialize, PartialEq)]
struct Greeting {
    message: String,
}

#[tokio::test]
async fn test_dispatch_json_decodes_typed_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/greeting")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "hi"}"#)
        .create_async()
        .await;

    let url = format!("{}/greeting", server.url());
    let greeting: Greeting = assert_ok!(RequestBuilder::new(url).dispatch_json().await);

    assert_eq!(
        greeting,
        Greeting {
            message: "hi".to_string()
        }
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_auto_dispatch_follows_the_content_type() {
    let mut server = mockito::Server::new_async().await;
    let json_mock = server
        .mock("GET", "/as-json")
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(r#"{"kind": "json"}"#)
        .create_async()
        .await;
    let text_mock = server
        .mock("GET", "/as-text")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("just text")
        .create_async()
        .await;

    let decoded: Decoded<Value> = RequestBuilder::new(format!("{}/as-json", server.url()))
        .dispatch()
        .await
        .unwrap();
    assert_eq!(decoded, Decoded::Json(json!({"kind": "json"})));

    let decoded: Decoded<Value> = RequestBuilder::new(format!("{}/as-text", server.url()))
        .dispatch()
        .await
        .unwrap();
    assert_eq!(decoded, Decoded::Text("just text".to_string()));

    json_mock.assert_async().await;
    text_mock.assert_async().await;
}

#[tokio::test]
async fn test_post_sends_headers_and_json_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/items")
        .match_header("content-type", "application/json")
        .match_header("authorization", "Bearer s3cr3t")
        .match_body(Matcher::Json(json!({"name": "demo"})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 1}"#)
        .create_async()
        .await;

    let headers = HeadersBuilder::new()
        .with_content_type_json()
        .with_bearer("s3cr3t")
        .build()
        .unwrap();

    let created: Value = RequestBuilder::new(format!("{}/items", server.url()))
        .with_method(Method::POST)
        .with_headers(headers)
        .with_body(&json!({"name": "demo"}))
        .dispatch_json()
        .await
        .unwrap();

    assert_eq!(created, json!({"id": 1}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_sends_no_body_even_when_configured() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/items")
        .match_body("")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .create_async()
        .await;

    let _: Value = RequestBuilder::new(format!("{}/items", server.url()))
        .with_body(&json!({"a": 1}))
        .with_plain_body("also ignored")
        .dispatch_json()
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_status_hook_reports_the_error_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "missing"}"#)
        .create_async()
        .await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    let body: Value = RequestBuilder::new(format!("{}/missing", server.url()))
        .with_error_handler(move |payload, status, status_text| {
            let decoded = match payload {
                ErrorPayload::Json(value) => value.clone(),
                other => panic!("unexpected payload: {:?}", other),
            };
            record
                .lock()
                .unwrap()
                .push((decoded, status, status_text.map(str::to_owned)));
        })
        .dispatch_json()
        .await
        .unwrap();

    assert_eq!(body, json!({"error": "missing"}));
    let calls = seen.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        (
            json!({"error": "missing"}),
            Some(404),
            Some("Not Found".to_string())
        )
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_text_returns_the_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/motd")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("hello text")
        .create_async()
        .await;

    let text = RequestBuilder::new(format!("{}/motd", server.url()))
        .dispatch_text()
        .await
        .unwrap();

    assert_eq!(text, "hello text");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_bytes_returns_the_raw_body() {
    let payload: &[u8] = &[0x00, 0x9F, 0x92, 0x96];

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/blob")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(payload)
        .create_async()
        .await;

    let bytes = RequestBuilder::new(format!("{}/blob", server.url()))
        .dispatch_bytes()
        .await
        .unwrap();

    assert_eq!(bytes.as_ref(), payload);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_same_builder_dispatches_twice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/echo")
        .match_body(Matcher::Json(json!({"n": 1})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"n": 1}"#)
        .expect(2)
        .create_async()
        .await;

    let builder = RequestBuilder::new(format!("{}/echo", server.url()))
        .with_method(Method::POST)
        .with_body(&json!({"n": 1}));

    let first: Value = builder.dispatch_json().await.unwrap();
    let second: Value = builder.dispatch_json().await.unwrap();

    assert_eq!(first, second);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_failed_connection_reports_then_returns_the_error() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    // Port 1 is never listening, so the transport fails fast.
    let result = RequestBuilder::new("http://127.0.0.1:1/unreachable")
        .with_error_handler(move |payload, status, status_text| {
            assert!(matches!(payload, ErrorPayload::Error(_)));
            assert_eq!(status, None);
            assert_eq!(status_text, None);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .dispatch_text()
        .await;

    assert!(result.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
