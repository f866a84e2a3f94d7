//! # strand
//!
//! A small HTTP framework built around one idea: a request passes through an
//! ordered chain of middleware and ends at a single handler, as one
//! synchronous call.
//!
//! ## The pipeline
//!
//! Every middleware receives the request and a continuation, [`Next`], for
//! the rest of the chain. It may:
//!
//! - **delegate**: `next.run(req)`, optionally post-processing the result;
//! - **derive**: `next.run(&req.with_header(..))`, so everything downstream
//!   sees a new request while the original stays untouched;
//! - **short-circuit**: return a response without calling `next`, in which
//!   case nothing further down runs.
//!
//! Errors raised anywhere in the chain propagate to the caller of
//! [`Pipeline::dispatch`]. Converting them into responses is a middleware's
//! job ([`middleware::Recover`]), not the pipeline's.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strand::{health, middleware, Method, Pipeline, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strand::Error> {
//!     let routes = Router::new()
//!         .get("/healthz", health::liveness)
//!         .on(Method::GET, "/users/{id}", get_user)
//!         .on(Method::POST, "/users", create_user);
//!
//!     let app = Pipeline::new(routes)
//!         .layer(middleware::Trace)
//!         .layer(middleware::RequestId)
//!         .layer(middleware::Recover::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! fn get_user(req: &Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! fn create_user(req: &Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```

mod config;
mod error;
mod handler;
mod pipeline;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use config::Config;
pub use error::Error;
pub use handler::{handler_fn, BoxedHandler, FnHandler, Handler, IntoHandlerResult};
pub use http::{Method, StatusCode};
pub use pipeline::{Middleware, Next, Pipeline};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
