use uuid::Uuid;

use crate::error::Error;
use crate::pipeline::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Makes sure every request carries an `x-request-id`.
///
/// An id supplied by the client (or the proxy in front of us) is kept.
/// Otherwise a UUID v4 is generated and downstream units receive a derived
/// request carrying it. Either way the id is echoed on the response.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestId;

impl RequestId {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestId {
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error> {
        let (id, res) = match req.header(REQUEST_ID_HEADER) {
            Some(id) => (id.to_owned(), next.run(req)?),
            None => {
                let id = Uuid::new_v4().to_string();
                let res = next.run(&req.with_header(REQUEST_ID_HEADER, id.as_str()))?;
                (id, res)
            }
        };
        Ok(res.with_header(REQUEST_ID_HEADER, id))
    }
}
