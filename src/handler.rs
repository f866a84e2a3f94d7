//! Terminal handlers and type erasure.
//!
//! A [`Handler`] is the last unit of a chain: it receives a request and
//! produces a response with nothing further to delegate to. The [`Router`],
//! a [`Pipeline`], or any plain function wrapped with [`handler_fn`] can play
//! that role.
//!
//! Handlers of different concrete types are stored side by side as
//! [`BoxedHandler`] trait objects:
//!
//! ```text
//! fn hello(req: &Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! Arc::new(FnHandler(hello))                  ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn Handler>
//! handler.handle(&req)  at request time       ← one vtable dispatch
//! ```
//!
//! [`Router`]: crate::Router
//! [`Pipeline`]: crate::Pipeline

use std::sync::Arc;

use http::StatusCode;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A terminal handler: turns one request into one response.
///
/// Returning `Err` means the handler failed instead of answering. The error
/// propagates unchanged to whoever started the dispatch.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, req: &Request) -> Result<Response, Error>;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn handle(&self, req: &Request) -> Result<Response, Error> {
        (**self).handle(req)
    }
}

// ── Handler results ───────────────────────────────────────────────────────────

/// Anything a handler function may return.
///
/// Plain response-like values always succeed. `Result<T, E>` lets a handler
/// fail with any error convertible into [`Error`].
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> Result<Response, Error>;
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> Result<Response, Error> { Ok(self) }
}

impl IntoHandlerResult for StatusCode {
    fn into_handler_result(self) -> Result<Response, Error> { Ok(self.into_response()) }
}

impl IntoHandlerResult for String {
    fn into_handler_result(self) -> Result<Response, Error> { Ok(self.into_response()) }
}

impl IntoHandlerResult for &'static str {
    fn into_handler_result(self) -> Result<Response, Error> { Ok(self.into_response()) }
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: IntoResponse,
    E: Into<Error>,
{
    fn into_handler_result(self) -> Result<Response, Error> {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Function adapter ──────────────────────────────────────────────────────────

/// Wraps a plain function or closure as a [`Handler`].
///
/// ```rust
/// use strand::{handler_fn, Handler, Method, Request, Response};
///
/// let hello = handler_fn(|_req: &Request| Response::text("hello"));
/// let res = hello.handle(&Request::new(Method::GET, "/")).unwrap();
/// assert_eq!(res.body(), b"hello");
/// ```
pub fn handler_fn<F, R>(f: F) -> FnHandler<F>
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    FnHandler(f)
}

/// Newtype that bridges a typed function to the [`Handler`] trait.
/// Obtain via [`handler_fn`].
pub struct FnHandler<F>(F);

impl<F, R> Handler for FnHandler<F>
where
    F: Fn(&Request) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    fn handle(&self, req: &Request) -> Result<Response, Error> {
        (self.0)(req).into_handler_result()
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    #[test]
    fn status_return_becomes_empty_response() {
        let h = handler_fn(|_: &Request| StatusCode::NO_CONTENT);
        let res = h.handle(&Request::new(Method::DELETE, "/users/1")).unwrap();
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert!(res.body().is_empty());
    }

    #[test]
    fn err_return_propagates() {
        let h = handler_fn(|_: &Request| -> Result<Response, Error> {
            Err(Error::handler("db down"))
        });
        let err = h.handle(&Request::new(Method::GET, "/")).unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
    }

    #[test]
    fn arc_forwards() {
        let h: BoxedHandler = Arc::new(handler_fn(|req: &Request| req.path().to_owned()));
        let res = h.handle(&Request::new(Method::GET, "/echo")).unwrap();
        assert_eq!(res.body(), b"/echo");
    }
}
