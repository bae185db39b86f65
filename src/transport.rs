//! The HTTP client primitive behind dispatch.
//!
//! This crate orchestrates an existing HTTP client rather than speaking the
//! protocol itself. [`Transport`] is that seam: it receives one assembled
//! [`FetchRequest`] and returns a buffered [`FetchResponse`]. The default
//! implementation, [`ReqwestTransport`], executes calls with [`reqwest`];
//! tests and embedders can substitute their own.
//!
//! # Option handling in the default transport
//!
//! | Option | Treatment |
//! |--------|-----------|
//! | `redirect` | Mapped to a reqwest redirect policy |
//! | `mode` | Carried but ignored (no same-origin model natively) |
//! | `credentials` | Carried but ignored (no ambient cookie jar) |

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method};
use once_cell::sync::{Lazy, OnceCell};

use crate::error::{FetchError, Result};
use crate::options::{CredentialsPolicy, RedirectPolicy, RequestMode};
use crate::response::FetchResponse;

/// The assembled configuration for one network call.
///
/// Produced by [`RequestBuilder`](crate::RequestBuilder) at dispatch time
/// and consumed whole by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Target URL.
    pub url: String,
    /// HTTP verb.
    pub method: Method,
    /// Request headers, append order preserved.
    pub headers: HeaderMap,
    /// Encoded payload: JSON text for structured bodies, verbatim text for
    /// plain bodies, `None` when no body travels.
    pub body: Option<String>,
    /// Cross-origin mode token, present only when explicitly configured.
    pub mode: Option<RequestMode>,
    /// Redirect policy token.
    pub redirect: Option<RedirectPolicy>,
    /// Credentials policy token.
    pub credentials: Option<CredentialsPolicy>,
}

/// An HTTP client primitive able to execute one call.
///
/// Implementations must buffer the full response body before returning.
/// They interpret the option tokens as their environment allows; tokens
/// with no local meaning are ignored, not rejected.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the call and buffer the reply.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

/// Default [`Transport`] backed by a [`reqwest::Client`].
///
/// reqwest scopes redirect behavior to the client, not the request, so
/// per-request [`RedirectPolicy`] overrides are served from dedicated
/// clients built lazily on first use and cached for the transport's
/// lifetime.
#[derive(Debug)]
pub struct ReqwestTransport {
    follow: reqwest::Client,
    manual: OnceCell<reqwest::Client>,
    error: OnceCell<reqwest::Client>,
}

impl ReqwestTransport {
    /// Create a transport with a fresh reqwest client.
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Wrap an already configured reqwest client.
    ///
    /// The wrapped client serves `Follow` (and unset) redirect policies;
    /// `Manual` and `Error` still go through internally built clients.
    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport {
            follow: client,
            manual: OnceCell::new(),
            error: OnceCell::new(),
        }
    }

    fn client_for(&self, redirect: Option<RedirectPolicy>) -> Result<&reqwest::Client> {
        match redirect {
            None | Some(RedirectPolicy::Follow) => Ok(&self.follow),
            Some(RedirectPolicy::Manual) => self.manual.get_or_try_init(|| {
                reqwest::Client::builder()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()
                    .map_err(|e| FetchError::Builder(e.to_string()))
            }),
            Some(RedirectPolicy::Error) => self.error.get_or_try_init(|| {
                reqwest::Client::builder()
                    .redirect(reqwest::redirect::Policy::custom(|attempt| {
                        attempt.error("redirects are disabled for this request")
                    }))
                    .build()
                    .map_err(|e| FetchError::Builder(e.to_string()))
            }),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        let FetchRequest {
            url,
            method,
            headers,
            body,
            mode,
            redirect,
            credentials,
        } = request;

        tracing::trace!(
            method = %method,
            url = %url,
            mode = ?mode,
            credentials = ?credentials,
            "executing request"
        );

        let client = self.client_for(redirect)?;
        let mut call = client.request(method, url).headers(headers);
        if let Some(body) = body {
            call = call.body(body);
        }

        let response = call.send().await.map_err(FetchError::from)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(FetchError::from)?;

        Ok(FetchResponse::new(status, headers, body))
    }
}

/// Process-wide transport shared by builders that do not inject their own.
pub(crate) fn default_transport() -> Arc<dyn Transport> {
    static SHARED: Lazy<Arc<ReqwestTransport>> =
        Lazy::new(|| Arc::new(ReqwestTransport::new()));
    SHARED.clone()
}
