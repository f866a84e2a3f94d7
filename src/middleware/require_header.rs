use http::StatusCode;

use crate::error::Error;
use crate::pipeline::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Short-circuits requests that lack a header.
///
/// When the header is missing the rest of the chain never runs and the
/// configured rejection (default `401 Unauthorized`) is returned.
#[derive(Clone, Debug)]
pub struct RequireHeader {
    name: String,
    rejection: Response,
}

impl RequireHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rejection: Response::status(StatusCode::UNAUTHORIZED) }
    }

    /// Replaces the response returned when the header is absent.
    pub fn reject_with(mut self, rejection: Response) -> Self {
        self.rejection = rejection;
        self
    }
}

impl Middleware for RequireHeader {
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error> {
        match req.header(&self.name) {
            Some(_) => next.run(req),
            None => Ok(self.rejection.clone()),
        }
    }
}
