use http::StatusCode;
use tracing::error;

use crate::error::Error;
use crate::pipeline::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Converts an error raised further down the chain into a response.
///
/// The pipeline itself never recovers; put `Recover` in front of whatever
/// may fail when clients should get a `500 Internal Server Error` instead of
/// the error reaching the caller. Error details are logged, not sent.
#[derive(Clone, Debug)]
pub struct Recover {
    fallback: Response,
}

impl Recover {
    pub fn new() -> Self {
        Self { fallback: Response::status(StatusCode::INTERNAL_SERVER_ERROR) }
    }

    /// Replaces the response sent in place of an error.
    pub fn with_fallback(fallback: Response) -> Self {
        Self { fallback }
    }
}

impl Default for Recover {
    fn default() -> Self { Self::new() }
}

impl Middleware for Recover {
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error> {
        match next.run(req) {
            Ok(res) => Ok(res),
            Err(e) => {
                error!(error = %e, method = %req.method(), path = %req.path(), "recovered from handler error");
                Ok(self.fallback.clone())
            }
        }
    }
}
