#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Fluent Fetch: Chained HTTP Requests
//!
//! This crate is a thin convenience layer over an HTTP client: requests are
//! described through chained builder calls and executed with one terminal
//! operation that races the network against a timeout and decodes the reply.
//!
//! ## Overview
//!
//! Three pieces compose every call:
//!
//! 1. **Header building** - [`HeadersBuilder`] collects headers fluently,
//!    with shortcuts for JSON content types and `Authorization` tokens
//! 2. **Request building** - [`RequestBuilder`] accumulates method, headers,
//!    body, timeout, and option tokens without ever failing mid-chain
//! 3. **Dispatch** - four terminal operations decode the reply as sniffed
//!    JSON-or-text, JSON, text, or raw bytes
//!
//! ## Key Features
//!
//! - **Timeout racing**: every call races a timer; the timer winning leaves
//!   the call running detached with its result discarded
//! - **Errors stay visible**: non-2xx responses are returned decoded and
//!   reported to an optional hook; failed calls are reported, then returned
//! - **Deferred configuration errors**: invalid headers and unserializable
//!   bodies surface at dispatch, through the same error path as everything
//!   else
//! - **Pluggable transport**: the [`Transport`] trait hides the HTTP
//!   primitive; reqwest by default, anything buffered in tests
//!
//! ## Dispatching a Request
//!
//! ```no_run
//! use fluent_fetch::{Decoded, RequestBuilder};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fluent_fetch::FetchError> {
//!     let builder = RequestBuilder::new("https://api.example.com/status")
//!         .with_header("accept", "application/json")
//!         .with_error_handler(|_payload, status, status_text| {
//!             eprintln!("request failed: {:?} {:?}", status, status_text);
//!         });
//!
//!     match builder.dispatch::<Value>().await? {
//!         Decoded::Json(value) => println!("json: {}", value),
//!         Decoded::Text(text) => println!("text: {}", text),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[headers]** - Fluent header collection building
//! - **[request]** - Request configuration and the four dispatch operations
//! - **[response]** - Buffered responses and body decoding
//! - **[timeout]** - The timeout race
//! - **[transport]** - The HTTP client seam and its reqwest implementation
//! - **[options]** - Mode, redirect, and credentials tokens
//! - **[error]** - Error types and result handling

pub mod error;
pub mod headers;
pub mod options;
pub mod request;
pub mod response;
pub mod timeout;
pub mod transport;

pub use error::{FetchError, Result};
pub use headers::HeadersBuilder;
pub use options::{CredentialsPolicy, RedirectPolicy, RequestMode};
pub use request::{Decoded, ErrorHandler, ErrorPayload, RequestBuilder};
pub use response::FetchResponse;
pub use timeout::{fetch_with_timeout, DEFAULT_TIMEOUT};
pub use transport::{FetchRequest, ReqwestTransport, Transport};

pub use http::{HeaderMap, Method, StatusCode};
