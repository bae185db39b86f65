//! Basic fluent dispatch example
//!
//! Fetches a JSON document with debug tracing enabled and auto-decodes
//! the reply by content type.
//!
//! Run with: cargo run --example fetch_json

use fluent_fetch::{Decoded, HeadersBuilder, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), fluent_fetch::FetchError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Fluent Fetch Example");
    println!("====================\n");

    let headers = HeadersBuilder::new()
        .with_header("accept", "application/json")
        .build()?;

    let decoded: Decoded<Value> = RequestBuilder::new("https://httpbin.org/json")
        .with_headers(headers)
        .with_timeout(Duration::from_secs(5))
        .with_debug(true)
        .with_error_handler(|payload, status, status_text| {
            eprintln!(
                "request failed: {:?} ({:?} {:?})",
                payload, status, status_text
            );
        })
        .dispatch()
        .await?;

    match decoded {
        Decoded::Json(value) => println!("json:\n{:#}", value),
        Decoded::Text(text) => println!("text:\n{}", text),
    }

    Ok(())
}
