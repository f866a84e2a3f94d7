//! The middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of [`Middleware`] plus exactly one
//! terminal [`Handler`], executed as a single synchronous call:
//!
//! ```text
//! dispatch(req)
//!   └─ mw[0].process(req, next₁)
//!        └─ next₁.run(req')  → mw[1].process(req', next₂)
//!             └─ next₂.run(req'') → handler.handle(req'')
//! ```
//!
//! Each middleware decides whether to call its continuation. If it does not,
//! the chain stops there and its return value is the response. Anything a
//! middleware does with the value coming back from `next.run` happens in
//! reverse order of entry, because that is how the call stack unwinds.
//!
//! The continuation is an explicit cursor (the remaining middleware slice plus
//! the handler), not a chain of nested closures. Nothing is allocated per
//! dispatch, and [`Next::run`] takes `self` so a continuation runs at most once.

use std::sync::Arc;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

/// A unit of request processing.
///
/// Receives the request and the rest of the chain. Return `next.run(req)`
/// (or something derived from its result) to delegate, or return a response
/// directly to short-circuit.
///
/// To change what downstream units see, build a derived request and pass it
/// to `next.run`; `req` itself cannot be altered.
pub trait Middleware: Send + Sync + 'static {
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error>;
}

/// A heap-allocated, type-erased middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The rest of the chain from a given position onward.
pub struct Next<'a> {
    rest: &'a [BoxedMiddleware],
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    /// Runs the remainder of the chain with `req`.
    ///
    /// Invokes the next middleware if one is left, otherwise the terminal
    /// handler.
    pub fn run(self, req: &Request) -> Result<Response, Error> {
        match self.rest.split_first() {
            Some((head, rest)) => head.process(req, Next { rest, handler: self.handler }),
            None => self.handler.handle(req),
        }
    }

    /// Number of middleware still ahead of the terminal handler.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

/// An ordered middleware chain ending in one terminal handler.
///
/// Build it once and share it; dispatch only reads it.
///
/// ```rust
/// use strand::{handler_fn, middleware, Method, Pipeline, Request, Response, StatusCode};
///
/// let app = Pipeline::new(handler_fn(|_: &Request| Response::text("secret")))
///     .layer(middleware::RequireHeader::new("authorization"));
///
/// let denied = app.dispatch(&Request::new(Method::GET, "/")).unwrap();
/// assert_eq!(denied.status_code(), StatusCode::UNAUTHORIZED);
///
/// let req = Request::new(Method::GET, "/").with_header("authorization", "Bearer t");
/// assert_eq!(app.dispatch(&req).unwrap().body(), b"secret");
/// ```
pub struct Pipeline {
    middleware: Vec<BoxedMiddleware>,
    handler: BoxedHandler,
}

impl Pipeline {
    /// Creates a chain with no middleware in front of `handler`.
    pub fn new(handler: impl Handler) -> Self {
        Self { middleware: Vec::new(), handler: Arc::new(handler) }
    }

    /// Appends a middleware. Returns `self` for chaining.
    ///
    /// The first layer added is the outermost: it sees the request first and
    /// the response last.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared middleware.
    pub fn layer_arc(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Runs `req` through every middleware and, unless one short-circuits,
    /// the terminal handler.
    ///
    /// Errors raised anywhere in the chain are returned as-is.
    pub fn dispatch(&self, req: &Request) -> Result<Response, Error> {
        Next { rest: &self.middleware, handler: &*self.handler }.run(req)
    }

    /// Number of middleware in front of the handler.
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }
}

/// A pipeline is itself a terminal handler, so chains nest.
impl Handler for Pipeline {
    fn handle(&self, req: &Request) -> Result<Response, Error> {
        self.dispatch(req)
    }
}
