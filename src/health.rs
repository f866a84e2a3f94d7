//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! ```rust
//! use strand::{health, Router};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Register health routes on a router that is served *outside* any
//! authentication middleware, or probes will be rejected.

use crate::{Request, Response};

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub fn liveness(_req: &Request) -> Response {
    Response::text("ok")
}

/// Readiness probe (default implementation). `200 OK` with body `"ready"`.
///
/// Replace with your own handler to gate on dependency health.
pub fn readiness(_req: &Request) -> Response {
    Response::text("ready")
}
