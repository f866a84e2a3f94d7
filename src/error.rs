//! Unified error type.

use std::net::AddrParseError;

/// The error type returned by strand's fallible operations.
///
/// Application-level outcomes (404, 401, 422, etc.) are expressed as
/// [`Response`](crate::Response) values, not as `Error`s. This type covers
/// infrastructure failures and errors a handler or middleware raises instead
/// of producing a response. The pipeline never recovers from the latter; they
/// reach whoever called [`Pipeline::dispatch`](crate::Pipeline::dispatch).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("config: {0}")]
    Config(#[from] envy::Error),

    /// Raised by a handler or middleware in place of a response.
    #[error("handler: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wraps an application error (or a plain message) raised from a handler.
    ///
    /// ```rust
    /// let err = strand::Error::handler("tenant lookup failed");
    /// assert_eq!(err.to_string(), "handler: tenant lookup failed");
    /// ```
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Handler(err.into())
    }
}
