//! Fluent request building and dispatch.
//!
//! [`RequestBuilder`] accumulates configuration through chained `with_*`
//! calls and executes it with one of four terminal operations, each pairing
//! the timeout race with a decoding mode:
//!
//! | Operation | Decoding |
//! |-----------|----------|
//! | [`dispatch`](RequestBuilder::dispatch) | Sniffed from `Content-Type`: JSON or text |
//! | [`dispatch_json`](RequestBuilder::dispatch_json) | Always JSON |
//! | [`dispatch_text`](RequestBuilder::dispatch_text) | Always text |
//! | [`dispatch_bytes`](RequestBuilder::dispatch_bytes) | Raw bytes, no decoding |
//!
//! Dispatch never swallows an outcome. A non-2xx response is reported to
//! the optional error hook and still returned decoded; a failed call is
//! reported to the hook and still returned as the error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::options::{CredentialsPolicy, RedirectPolicy, RequestMode};
use crate::response::FetchResponse;
use crate::timeout::{fetch_with_timeout, DEFAULT_TIMEOUT};
use crate::transport::{default_transport, FetchRequest, Transport};

/// What the error hook is shown.
///
/// Non-2xx responses hand over the body decoded in the shape the terminal
/// operation produced; failed calls hand over the failure itself.
#[derive(Debug)]
pub enum ErrorPayload<'a> {
    /// Decoded JSON body of a non-2xx response.
    Json(&'a Value),
    /// Decoded text body of a non-2xx response.
    Text(&'a str),
    /// The whole response of a non-2xx bytes dispatch.
    Response(&'a FetchResponse),
    /// The failure that ended the dispatch.
    Error(&'a FetchError),
}

/// Observer invoked on non-2xx responses and on failed calls.
///
/// For a non-2xx response the hook receives the decoded payload plus the
/// status code and status text; for a failed call it receives the error
/// and no status. It runs at most once per dispatch, never on success,
/// and cannot change the dispatch outcome.
pub type ErrorHandler =
    Arc<dyn for<'a> Fn(ErrorPayload<'a>, Option<u16>, Option<&'a str>) + Send + Sync>;

/// Outcome of an auto-decoded dispatch.
///
/// [`dispatch`](RequestBuilder::dispatch) picks the decoding mode from the
/// response's `Content-Type`, so the variant tells the caller which path
/// was taken.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// The content type contained `application/json`.
    Json(T),
    /// Any other content type; the body decoded as text.
    Text(String),
}

impl<T> Decoded<T> {
    /// Whether the JSON path was taken.
    pub fn is_json(&self) -> bool {
        matches!(self, Decoded::Json(_))
    }

    /// Whether the text path was taken.
    pub fn is_text(&self) -> bool {
        matches!(self, Decoded::Text(_))
    }

    /// The decoded JSON value, if that path was taken.
    pub fn into_json(self) -> Option<T> {
        match self {
            Decoded::Json(value) => Some(value),
            Decoded::Text(_) => None,
        }
    }

    /// The decoded text, if that path was taken.
    pub fn into_text(self) -> Option<String> {
        match self {
            Decoded::Json(_) => None,
            Decoded::Text(text) => Some(text),
        }
    }
}

/// Fluent, re-dispatchable request configuration.
///
/// A builder starts from a route, accumulates options through chained
/// calls, and dispatches with one of the terminal operations. Dispatching
/// borrows the builder, so the same configuration can be sent again.
///
/// Configuration calls never fail mid-chain. An invalid header or an
/// unserializable body is remembered and surfaces as
/// [`FetchError::Builder`] when dispatching, flowing through the same
/// error path (hook included) as any other failure.
///
/// # Examples
///
/// ```no_run
/// use fluent_fetch::{HeadersBuilder, Method, RequestBuilder};
/// use serde_json::{json, Value};
///
/// #[tokio::main]
/// async fn main() -> Result<(), fluent_fetch::FetchError> {
///     let headers = HeadersBuilder::new()
///         .with_content_type_json()
///         .with_bearer("s3cr3t")
///         .build()?;
///
///     let created: Value = RequestBuilder::new("https://api.example.com/items")
///         .with_method(Method::POST)
///         .with_headers(headers)
///         .with_body(&json!({ "name": "demo" }))
///         .dispatch_json()
///         .await?;
///
///     println!("created: {}", created);
///     Ok(())
/// }
/// ```
pub struct RequestBuilder {
    route: String,
    method: Method,
    headers: HeaderMap,
    body: Option<Value>,
    plain_body: Option<String>,
    mode: Option<RequestMode>,
    redirect: Option<RedirectPolicy>,
    credentials: Option<CredentialsPolicy>,
    timeout: Duration,
    error_handler: Option<ErrorHandler>,
    debug: bool,
    transport: Arc<dyn Transport>,
    invalid: Option<FetchError>,
}

impl RequestBuilder {
    /// Start a request against `route`.
    ///
    /// Defaults: `GET`, no headers, no body, a 10 second timeout, no
    /// error hook, and the process-wide reqwest transport.
    pub fn new(route: impl Into<String>) -> Self {
        RequestBuilder {
            route: route.into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            plain_body: None,
            mode: None,
            redirect: None,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            error_handler: None,
            debug: false,
            transport: default_transport(),
            invalid: None,
        }
    }

    /// Set the HTTP verb.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the header collection, usually one built with
    /// [`HeadersBuilder`](crate::HeadersBuilder).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Append a single header without disturbing those already set.
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        match (key.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.stash(FetchError::Builder(format!("Invalid header name: {}", e))),
            (_, Err(e)) => self.stash(FetchError::Builder(format!("Invalid header value: {}", e))),
        }
        self
    }

    /// Attach a structured body, serialized to JSON at dispatch.
    ///
    /// Takes precedence over [`with_plain_body`](Self::with_plain_body)
    /// when both are set. A value that cannot be serialized surfaces as
    /// [`FetchError::Builder`] when dispatching.
    pub fn with_body<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => self.stash(FetchError::Builder(format!("Unserializable body: {}", e))),
        }
        self
    }

    /// Attach a plain text body, sent verbatim.
    pub fn with_plain_body(mut self, body: impl Into<String>) -> Self {
        self.plain_body = Some(body.into());
        self
    }

    /// Set the cross-origin mode token. Left unset, none is forwarded.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the redirect policy token.
    pub fn with_redirect(mut self, redirect: RedirectPolicy) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set the credentials policy token.
    pub fn with_credentials(mut self, credentials: CredentialsPolicy) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Bound the call's latency. Defaults to
    /// [`DEFAULT_TIMEOUT`](crate::DEFAULT_TIMEOUT).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Install the error hook. See [`ErrorHandler`] for the contract.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: for<'a> Fn(ErrorPayload<'a>, Option<u16>, Option<&'a str>) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Emit `tracing` debug events for the outgoing request and the
    /// decoded result. Purely observational.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Route the call through a custom [`Transport`].
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Dispatch and decode by content type.
    ///
    /// A `Content-Type` containing `application/json` decodes the body as
    /// JSON into `T`; anything else decodes it as text. See
    /// [`dispatch_json`](Self::dispatch_json) for the error hook contract
    /// shared by all terminal operations.
    pub async fn dispatch<T: DeserializeOwned>(&self) -> Result<Decoded<T>> {
        let response = self.execute_notified().await?;
        if response.is_json() {
            self.decode_json(&response).map(Decoded::Json)
        } else {
            let text = response.text();
            self.trace_result(&text, &response);
            if !response.ok() {
                self.notify(
                    ErrorPayload::Text(&text),
                    Some(response.status()),
                    Some(response.status_text()),
                );
            }
            Ok(Decoded::Text(text))
        }
    }

    /// Dispatch and decode the body as JSON into `T`, whatever the
    /// declared content type.
    ///
    /// A non-2xx response is not an error: its body is decoded and
    /// returned like any other, after the hook (when installed) has seen
    /// it together with the status code and status text. When the call
    /// itself fails the hook sees the failure, and the failure is then
    /// returned.
    ///
    /// # Errors
    ///
    /// [`FetchError::Timeout`] when the timer wins the race,
    /// [`FetchError::Transport`] when the call fails,
    /// [`FetchError::Decode`] when the body does not parse into `T`, and
    /// [`FetchError::Builder`] when the configuration was invalid.
    pub async fn dispatch_json<T: DeserializeOwned>(&self) -> Result<T> {
        let response = self.execute_notified().await?;
        self.decode_json(&response)
    }

    /// Dispatch and decode the body as text.
    ///
    /// Text decoding is lossy UTF-8 and cannot fail, so the only errors
    /// here are the call's own.
    pub async fn dispatch_text(&self) -> Result<String> {
        let response = self.execute_notified().await?;
        let text = response.text();
        self.trace_result(&text, &response);
        if !response.ok() {
            self.notify(
                ErrorPayload::Text(&text),
                Some(response.status()),
                Some(response.status_text()),
            );
        }
        Ok(text)
    }

    /// Dispatch and hand back the raw body bytes.
    ///
    /// On a non-2xx status the hook receives the whole
    /// [`FetchResponse`] rather than a decoded body.
    pub async fn dispatch_bytes(&self) -> Result<Bytes> {
        let response = self.execute_notified().await?;
        if self.debug {
            tracing::debug!(
                len = response.bytes().len(),
                ok = response.ok(),
                "request yielded"
            );
        }
        if !response.ok() {
            self.notify(
                ErrorPayload::Response(&response),
                Some(response.status()),
                Some(response.status_text()),
            );
        }
        Ok(response.bytes())
    }

    /// Build the transport bundle for one call.
    fn assemble(&self) -> Result<FetchRequest> {
        if let Some(invalid) = &self.invalid {
            return Err(invalid.clone());
        }

        if self.debug {
            tracing::debug!(
                route = %self.route,
                method = %self.method,
                headers = ?self.headers,
                body = ?self.body,
                plain_body = ?self.plain_body,
                "dispatching request"
            );
        }

        // GET and HEAD never carry a body; otherwise the structured body
        // wins over the plain one.
        let body = if self.method == Method::GET || self.method == Method::HEAD {
            None
        } else {
            match (&self.body, &self.plain_body) {
                (Some(structured), _) => Some(structured.to_string()),
                (None, Some(plain)) => Some(plain.clone()),
                (None, None) => None,
            }
        };

        Ok(FetchRequest {
            url: self.route.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            body,
            mode: self.mode,
            redirect: self.redirect,
            credentials: self.credentials,
        })
    }

    /// Run the assembled request through the timeout race.
    async fn execute(&self) -> Result<FetchResponse> {
        let request = self.assemble()?;
        let transport = Arc::clone(&self.transport);
        fetch_with_timeout(async move { transport.fetch(request).await }, self.timeout).await
    }

    /// Like [`execute`](Self::execute), but reports a failed call to the
    /// hook before handing the failure back.
    async fn execute_notified(&self) -> Result<FetchResponse> {
        match self.execute().await {
            Ok(response) => Ok(response),
            Err(e) => {
                self.notify_failure(&e);
                Err(e)
            }
        }
    }

    /// Shared JSON tail: decode to a [`Value`], run the non-2xx hook,
    /// then convert into `T`.
    ///
    /// Decoding through a `Value` keeps the hook independent of `T`: an
    /// error body is reported in full even when its shape has nothing to
    /// do with what the caller asked for.
    fn decode_json<T: DeserializeOwned>(&self, response: &FetchResponse) -> Result<T> {
        let value: Value = match response.json() {
            Ok(value) => value,
            Err(e) => {
                self.notify_failure(&e);
                return Err(e);
            }
        };
        self.trace_result(&value, response);

        let status_notified = !response.ok();
        if status_notified {
            self.notify(
                ErrorPayload::Json(&value),
                Some(response.status()),
                Some(response.status_text()),
            );
        }

        match serde_json::from_value(value) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                // The hook runs at most once per dispatch: after a non-2xx
                // notification, a body that does not fit `T` propagates
                // without a second call.
                let e = FetchError::from(e);
                if !status_notified {
                    self.notify_failure(&e);
                }
                Err(e)
            }
        }
    }

    fn notify(&self, payload: ErrorPayload<'_>, status: Option<u16>, status_text: Option<&str>) {
        if let Some(handler) = &self.error_handler {
            handler(payload, status, status_text);
        }
    }

    fn notify_failure(&self, error: &FetchError) {
        self.notify(ErrorPayload::Error(error), None, None);
    }

    fn trace_result<V: fmt::Debug>(&self, decoded: &V, response: &FetchResponse) {
        if self.debug {
            tracing::debug!(result = ?decoded, ok = response.ok(), "request yielded");
        }
    }

    fn stash(&mut self, error: FetchError) {
        if self.invalid.is_none() {
            self.invalid = Some(error);
        }
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("route", &self.route)
            .field("method", &self.method)
            .field("timeout", &self.timeout)
            .field("has_error_handler", &self.error_handler.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}
