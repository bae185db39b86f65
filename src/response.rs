//! Buffered HTTP responses and body decoding.
//!
//! A [`FetchResponse`] is the fully read reply to one dispatched request.
//! Transports buffer the body before handing it over, so every decoding
//! accessor here is synchronous and can be called more than once.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A fully buffered HTTP response.
///
/// # Examples
///
/// ```
/// use fluent_fetch::FetchResponse;
/// use http::{HeaderMap, StatusCode};
///
/// let response = FetchResponse::new(StatusCode::OK, HeaderMap::new(), "hello");
/// assert!(response.ok());
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.text(), "hello");
/// ```
#[derive(Debug, Clone)]
pub struct FetchResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchResponse {
    /// Assemble a response from its parts.
    ///
    /// Public so custom [`Transport`](crate::Transport) implementations and
    /// tests can fabricate replies.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        FetchResponse {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Numeric HTTP status code.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Whether the status code is in the 2xx success range.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase for the status code.
    ///
    /// HTTP/2 carries no reason phrase on the wire, so this is derived from
    /// the code. Unknown codes yield an empty string.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Content-Type` header value, when present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Whether the declared content type contains `application/json`.
    ///
    /// Substring match, so parameterized types like
    /// `application/json; charset=utf-8` qualify.
    pub(crate) fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// Decode the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`](crate::FetchError::Decode) when the
    /// body is not valid JSON or does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Decode the body as text.
    ///
    /// Lossy UTF-8 conversion: invalid sequences become replacement
    /// characters rather than errors.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The raw body bytes.
    pub fn bytes(&self) -> Bytes {
        self.body.clone()
    }
}
