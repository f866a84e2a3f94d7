//! Minimal strand demo: a routed JSON API behind a middleware pipeline.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/healthz
//!   curl -H 'authorization: Bearer demo' http://localhost:3000/users/42
//!   curl -X POST -H 'authorization: Bearer demo' http://localhost:3000/users -d '{"name":"alice"}'
//!   curl http://localhost:3000/users/42            ← 401, no authorization header

use std::sync::Arc;

use strand::middleware::{self, from_fn, Next};
use strand::{health, Config, Method, Pipeline, Request, Response, Router, Server, StatusCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), strand::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let users = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", |_: &Request| StatusCode::NO_CONTENT);

    // Authenticated API: the gate short-circuits before the router runs.
    let api = Arc::new(
        Pipeline::new(users)
            .layer(middleware::RequireHeader::new("authorization"))
            .layer(from_fn(|req: &Request, next: Next<'_>| {
                let res = next.run(req)?;
                Ok(res.with_header("cache-control", "no-store"))
            })),
    );

    // Probes stay outside the gate.
    let routes = Router::new()
        .get("/healthz", health::liveness)
        .get("/readyz",  health::readiness)
        .handle(Method::GET,    "/users/{id}", Arc::clone(&api))
        .handle(Method::POST,   "/users",      Arc::clone(&api))
        .handle(Method::DELETE, "/users/{id}", api);

    let app = Pipeline::new(routes)
        .layer(middleware::Trace)
        .layer(middleware::RequestId)
        .layer(middleware::Recover::new());

    Server::from_config(&config).serve(app).await
}

// GET /users/{id}
fn get_user(req: &Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users
fn create_user(req: &Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#.as_bytes().to_vec())
}
