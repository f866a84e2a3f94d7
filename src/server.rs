//! HTTP server and graceful shutdown.
//!
//! The server is the transport around a [`Handler`]: it turns each hyper
//! request into a [`Request`], runs the handler, and writes the [`Response`]
//! back. Handlers are synchronous, so every dispatch runs on tokio's blocking
//! pool and never stalls the connection tasks.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`; no new connections are made.
//! 2. Letting every in-flight connection task run to completion, or until the
//!    configured drain timeout elapses.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{default_max_body_bytes, Config};
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::{BodyError, Request};
use crate::response::Response;

enum Listen {
    Addr(String),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listen: Listen,
    drain_timeout: Option<Duration>,
    max_body_bytes: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. The address is parsed then; a bad one is an
    /// [`Error::InvalidAddr`].
    ///
    /// ```rust
    /// use strand::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self::with_listen(Listen::Addr(addr.into()))
    }

    /// Configures the server from a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            listen: Listen::Addr(config.addr.clone()),
            drain_timeout: config.drain_timeout(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Serves on an already bound listener.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self::with_listen(Listen::Listener(listener))
    }

    fn with_listen(listen: Listen) -> Self {
        Self { listen, drain_timeout: None, max_body_bytes: default_max_body_bytes() }
    }

    /// Bounds how long shutdown waits for in-flight connections.
    pub fn drain_timeout(mut self, limit: Duration) -> Self {
        self.drain_timeout = Some(limit);
        self
    }

    /// Largest request body accepted; larger ones get `413 Payload Too Large`.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Starts accepting connections and dispatching them to `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by in-flight requests completing).
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown<S>(self, handler: impl Handler, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let listener = match self.listen {
            Listen::Listener(listener) => listener,
            Listen::Addr(addr) => {
                let parsed: SocketAddr = addr.parse()
                    .map_err(|source| Error::InvalidAddr { addr: addr.clone(), source })?;
                TcpListener::bind(parsed).await?
            }
        };

        // One shared handler for every connection task.
        let handler: BoxedHandler = Arc::new(handler);

        info!(addr = %listener.local_addr()?, "strand listening");

        let max_body_bytes = self.max_body_bytes;
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let handler = Arc::clone(&handler);
                            async move {
                                Ok::<_, Infallible>(
                                    dispatch(handler, req, remote_addr, max_body_bytes).await,
                                )
                            }
                        });

                        // HTTP/1.1 and HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        match self.drain_timeout {
            Some(limit) => {
                let drained = tokio::time::timeout(limit, async {
                    while tasks.join_next().await.is_some() {}
                })
                .await
                .is_ok();

                if !drained {
                    warn!(remaining = tasks.len(), "drain timeout elapsed, aborting connections");
                    tasks.shutdown().await;
                }
            }
            None => while tasks.join_next().await.is_some() {},
        }

        info!("strand stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Produces exactly one response per request. Every failure becomes a status
/// code here, so hyper never sees an error.
async fn dispatch(
    handler: BoxedHandler,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
    max_body_bytes: usize,
) -> http::Response<Full<Bytes>> {
    let request = match Request::from_hyper(req, max_body_bytes).await {
        Ok(r) => r,
        Err(BodyError::TooLarge) => {
            warn!(peer = %remote_addr, limit = max_body_bytes, "request body too large");
            return Response::status(StatusCode::PAYLOAD_TOO_LARGE).into_http();
        }
        Err(BodyError::Read(e)) => {
            warn!(peer = %remote_addr, "failed to read request body: {e}");
            return Response::status(StatusCode::BAD_REQUEST).into_http();
        }
    };

    let outcome = tokio::task::spawn_blocking(move || handler.handle(&request)).await;

    let response = match outcome {
        Ok(Ok(res)) => res,
        Ok(Err(e)) => {
            error!(peer = %remote_addr, error = %e, "unhandled handler error");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            error!(peer = %remote_addr, "handler panicked: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    response.into_http()
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
