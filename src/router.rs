//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. The router is a terminal
//! [`Handler`]: put it at the end of a [`Pipeline`](crate::Pipeline), or
//! serve it directly.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::Error;
use crate::handler::{handler_fn, BoxedHandler, Handler, IntoHandlerResult};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup. Each registration returns `self` so calls
/// chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a function for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// use strand::{Method, Request, Response, Router, StatusCode};
    ///
    /// fn get_user(req: &Request) -> Response {
    ///     Response::text(req.param("id").unwrap_or("unknown").to_owned())
    /// }
    ///
    /// let app = Router::new()
    ///     .on(Method::GET, "/users/{id}", get_user)
    ///     .on(Method::DELETE, "/users/{id}", |_: &Request| StatusCode::NO_CONTENT);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern or conflicts with an
    /// existing route for the same method.
    pub fn on<F, R>(self, method: Method, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.handle(method, path, handler_fn(f))
    }

    /// Register any [`Handler`], such as a per-route
    /// [`Pipeline`](crate::Pipeline).
    pub fn handle(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler) as BoxedHandler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get<F, R>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::GET, path, f)
    }

    pub fn post<F, R>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::POST, path, f)
    }

    pub fn put<F, R>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::PUT, path, f)
    }

    pub fn patch<F, R>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::PATCH, path, f)
    }

    pub fn delete<F, R>(self, path: &str, f: F) -> Self
    where
        F: Fn(&Request) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        self.on(Method::DELETE, path, f)
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, Vec<(String, String)>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// Methods with a route matching `path`, sorted, for the `Allow` header.
    /// `HEAD` is listed wherever `GET` is, since it falls back to `GET`.
    fn allowed_methods(&self, path: &str) -> Vec<&str> {
        let mut allowed: Vec<&str> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.as_str())
            .collect();
        if allowed.contains(&"GET") && !allowed.contains(&"HEAD") {
            allowed.push("HEAD");
        }
        allowed.sort_unstable();
        allowed
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Handler for Router {
    fn handle(&self, req: &Request) -> Result<Response, Error> {
        let found = self.lookup(req.method(), req.path()).or_else(|| {
            if *req.method() == Method::HEAD {
                self.lookup(&Method::GET, req.path())
            } else {
                None
            }
        });

        match found {
            Some((handler, params)) if params.is_empty() => handler.handle(req),
            Some((handler, params)) => handler.handle(&req.with_params(params)),
            None => {
                let allowed = self.allowed_methods(req.path());
                if allowed.is_empty() {
                    debug!(method = %req.method(), path = %req.path(), "no route");
                    return Ok(Response::status(StatusCode::NOT_FOUND));
                }
                debug!(method = %req.method(), path = %req.path(), "method not allowed");
                Ok(Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header("allow", &allowed.join(", "))
                    .no_body())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> Router {
        Router::new()
            .get("/users/{id}", |req: &Request| {
                format!("user {}", req.param("id").unwrap_or("?"))
            })
            .post("/users", |req: &Request| {
                if req.body().is_empty() {
                    return Response::status(StatusCode::BAD_REQUEST);
                }
                Response::builder()
                    .status(StatusCode::CREATED)
                    .header("location", "/users/99")
                    .no_body()
            })
    }

    #[test]
    fn extracts_path_params() {
        let res = Handler::handle(&app(), &Request::new(Method::GET, "/users/42")).unwrap();
        assert_eq!(res.body(), b"user 42");
    }

    #[test]
    fn unknown_path_is_404() {
        let res = Handler::handle(&app(), &Request::new(Method::GET, "/nope")).unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn wrong_method_is_405_with_allow() {
        let res = Handler::handle(&app(), &Request::new(Method::DELETE, "/users/42")).unwrap();
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.header("allow"), Some("GET, HEAD"));

        let app = app().put("/users", |_: &Request| StatusCode::NO_CONTENT);
        let res = Handler::handle(&app, &Request::new(Method::GET, "/users")).unwrap();
        assert_eq!(res.header("allow"), Some("POST, PUT"));
    }

    #[test]
    fn head_falls_back_to_get() {
        let res = Handler::handle(&app(), &Request::new(Method::HEAD, "/users/42")).unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"user 42");
    }

    #[test]
    fn explicit_head_route_wins() {
        let app = app().on(Method::HEAD, "/users/{id}", |_: &Request| StatusCode::NO_CONTENT);
        let res = Handler::handle(&app, &Request::new(Method::HEAD, "/users/42")).unwrap();
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn body_reaches_handler() {
        let req = Request::new(Method::POST, "/users").with_body(&b"{\"name\":\"alice\"}"[..]);
        let res = Handler::handle(&app(), &req).unwrap();
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.header("location"), Some("/users/99"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = Router::new()
            .get("/a/{x}", |_: &Request| "x")
            .get("/a/{y}", |_: &Request| "y");
    }
}
