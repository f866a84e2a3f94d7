use crate::error::Error;
use crate::pipeline::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Turns a closure into a [`Middleware`].
///
/// ```rust
/// use strand::middleware::{from_fn, Next};
/// use strand::{handler_fn, Method, Pipeline, Request, Response};
///
/// let stamp = from_fn(|req: &Request, next: Next<'_>| {
///     let res = next.run(req)?;
///     Ok(res.with_header("x-served-by", "strand"))
/// });
///
/// let app = Pipeline::new(handler_fn(|_: &Request| Response::text("hi"))).layer(stamp);
/// let res = app.dispatch(&Request::new(Method::GET, "/")).unwrap();
/// assert_eq!(res.header("x-served-by"), Some("strand"));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&Request, Next<'_>) -> Result<Response, Error> + Send + Sync + 'static,
{
    FromFn(f)
}

/// Middleware backed by a closure. Obtain via [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Middleware for FromFn<F>
where
    F: Fn(&Request, Next<'_>) -> Result<Response, Error> + Send + Sync + 'static,
{
    fn process(&self, req: &Request, next: Next<'_>) -> Result<Response, Error> {
        (self.0)(req, next)
    }
}
