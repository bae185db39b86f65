//! Fluent header collection building.
//!
//! [`HeadersBuilder`] assembles a [`HeaderMap`] through chained calls, with
//! shortcuts for the two headers almost every API call carries: a JSON
//! content type and an `Authorization` token.
//!
//! Values are appended rather than inserted, so repeated names keep every
//! value in the order it was added.

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{FetchError, Result};

/// Builds a [`HeaderMap`] through chained calls.
///
/// Invalid names or values do not interrupt the chain: the first failure
/// is remembered and reported by [`build`](Self::build), keeping call
/// sites free of per-header error handling.
///
/// # Examples
///
/// ```
/// use fluent_fetch::HeadersBuilder;
///
/// let headers = HeadersBuilder::new()
///     .with_content_type_json()
///     .with_bearer("s3cr3t")
///     .with_header("x-request-id", "abc-123")
///     .build()
///     .unwrap();
///
/// assert_eq!(headers.get("content-type").unwrap(), "application/json");
/// assert_eq!(headers.get("authorization").unwrap(), "Bearer s3cr3t");
/// ```
#[derive(Debug, Default)]
pub struct HeadersBuilder {
    headers: HeaderMap,
    invalid: Option<FetchError>,
}

impl HeadersBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, keeping any values already present under `key`.
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
            (Err(e), _) => self.stash(format!("Invalid header name: {}", e)),
            (_, Err(e)) => self.stash(format!("Invalid header value: {}", e)),
        }
        self
    }

    /// Append `Content-Type: application/json`.
    pub fn with_content_type_json(mut self) -> Self {
        self.headers
            .append(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Append an `Authorization` header of the form `{scheme} {token}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fluent_fetch::HeadersBuilder;
    ///
    /// let headers = HeadersBuilder::new().with_token("Basic", "dXNlcg==").build().unwrap();
    /// assert_eq!(headers.get("authorization").unwrap(), "Basic dXNlcg==");
    /// ```
    pub fn with_token(mut self, scheme: &str, token: &str) -> Self {
        match HeaderValue::try_from(format!("{} {}", scheme, token)) {
            Ok(value) => {
                self.headers.append(AUTHORIZATION, value);
            }
            Err(e) => self.stash(format!("Invalid authorization value: {}", e)),
        }
        self
    }

    /// Append a `Bearer` authorization token.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_token("Bearer", token)
    }

    /// Finish the chain.
    ///
    /// # Errors
    ///
    /// Returns the first invalid name or value recorded while building.
    pub fn build(self) -> Result<HeaderMap> {
        match self.invalid {
            Some(err) => Err(err),
            None => Ok(self.headers),
        }
    }

    fn stash(&mut self, message: String) {
        if self.invalid.is_none() {
            self.invalid = Some(FetchError::Builder(message));
        }
    }
}
