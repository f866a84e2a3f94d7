//! Built-in middleware.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, request-id injection,
//! authentication-header inspection, and turning failures into responses.
//!
//! | Middleware | Delegates? | What it does |
//! |---|---|---|
//! | [`Trace`] | always | per-request span with method, path, status, latency |
//! | [`RequestId`] | always | ensures `x-request-id`, echoes it on the response |
//! | [`RequireHeader`] | only if the header is present | short-circuits with a fixed response otherwise |
//! | [`Recover`] | always | converts an error from the rest of the chain into `500` |
//!
//! For one-off logic, [`from_fn`] turns a closure into a middleware.

mod from_fn;
mod recover;
mod request_id;
mod require_header;
mod trace;

pub use from_fn::{from_fn, FromFn};
pub use recover::Recover;
pub use request_id::{RequestId, REQUEST_ID_HEADER};
pub use require_header::RequireHeader;
pub use trace::Trace;

pub use crate::pipeline::{BoxedMiddleware, Middleware, Next};
