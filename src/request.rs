//! Incoming HTTP request type.
//!
//! A [`Request`] is immutable once built. Middleware that wants downstream
//! units to see something different builds a derived copy with one of the
//! `with_*` methods and passes that copy to its continuation. The value it
//! was handed stays exactly as it was.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tracing::warn;

/// Why a request body could not be read.
#[derive(Debug)]
pub(crate) enum BodyError {
    /// The body exceeded the configured limit.
    TooLarge,
    Read(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Converts wire headers, dropping values that are not valid UTF-8.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers.iter()
        .filter_map(|(k, v)| match std::str::from_utf8(v.as_bytes()) {
            Ok(value) => Some((k.as_str().to_owned(), value.to_owned())),
            Err(_) => {
                warn!(header = %k, "dropping request header with non-UTF-8 value");
                None
            }
        })
        .collect()
}

/// An incoming HTTP request.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    /// Builds a request with no headers, query string, or body.
    ///
    /// Useful for tests and for handlers that re-enter a pipeline.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    /// Reads a hyper request, buffering at most `max_body_bytes` of body.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
        max_body_bytes: usize,
    ) -> Result<Self, BodyError> {
        let (parts, body) = req.into_parts();
        let body = match Limited::new(body, max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => return Err(BodyError::TooLarge),
            Err(e) => return Err(BodyError::Read(e)),
        };

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers: header_pairs(&parts.headers),
            body,
            params: HashMap::new(),
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    // ── Derived copies ────────────────────────────────────────────────────────

    /// Returns a copy with `name` set to `value`, replacing any existing
    /// values for that header.
    pub fn with_header(&self, name: &str, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        next.headers.push((name.to_ascii_lowercase(), value.into()));
        next
    }

    /// Returns a copy without any values for `name`.
    pub fn without_header(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        next
    }

    /// Returns a copy carrying `body`.
    pub fn with_body(&self, body: impl Into<Bytes>) -> Self {
        Self { body: body.into(), ..self.clone() }
    }

    /// Returns a copy carrying `query` as its raw query string.
    pub fn with_query(&self, query: impl Into<String>) -> Self {
        Self { query: Some(query.into()), ..self.clone() }
    }

    /// Returns a copy whose route parameters are extended with `params`.
    pub fn with_params<I, K, V>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut next = self.clone();
        next.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        next
    }
}
