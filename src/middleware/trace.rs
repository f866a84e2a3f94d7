use std::time::Instant;

use tracing::{error, info, info_span};

use crate::error::Error;
use crate::pipeline::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Per-request tracing.
///
/// Opens an `http.request` span carrying the method and path, then logs the
/// status and latency once the rest of the chain returns. Errors are logged
/// and passed through untouched.
///
/// Place it first so the span covers every other middleware.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Trace {
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error> {
        let span = info_span!("http.request", method = %req.method(), path = %req.path());
        let _entered = span.enter();
        let started = Instant::now();

        let outcome = next.run(req);
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(res) => info!(status = res.status_code().as_u16(), latency_ms, "request completed"),
            Err(e) => error!(error = %e, latency_ms, "request failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::handler::handler_fn;
    use crate::pipeline::Pipeline;

    #[test]
    fn passes_response_through_unchanged() {
        let expected = Response::builder()
            .status(StatusCode::ACCEPTED)
            .header("x-job", "17")
            .text("queued");
        let reply = expected.clone();
        let app = Pipeline::new(handler_fn(move |_: &Request| reply.clone())).layer(Trace);

        let res = app.dispatch(&Request::new(Method::POST, "/jobs")).unwrap();
        assert_eq!(res, expected);
    }

    #[test]
    fn passes_error_through_unchanged() {
        let app = Pipeline::new(handler_fn(|_: &Request| -> Result<Response, Error> {
            Err(Error::handler("disk full"))
        }))
        .layer(Trace::new());

        let err = app.dispatch(&Request::new(Method::GET, "/")).unwrap_err();
        assert!(matches!(err, Error::Handler(_)));
        assert_eq!(err.to_string(), "handler: disk full");
    }
}
