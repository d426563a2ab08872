//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them with [`Router::health`](crate::Router::health), which tags
//! the routes as [`RouteKind::Health`](crate::RouteKind::Health):
//!
//! ```rust
//! use tsu_router::{RouteTree, Router, RouterOptions, health};
//!
//! let mut tree = RouteTree::new();
//! let mut app = Router::new(&mut tree, RouterOptions::default()).unwrap();
//! app.health("/healthz", health::liveness).unwrap();
//! app.health("/readyz", health::readiness).unwrap();
//! ```
//!
//! Replace `readiness` with your own handler if the pod has to warm up or
//! verify its dependencies before taking traffic.

use crate::context::Context;

/// Liveness probe. Always `200 OK` with body `"ok"`.
pub async fn liveness(mut ctx: Context) -> Context {
    ctx.text("ok");
    ctx
}

/// Readiness probe (default implementation). `200 OK` with body `"ready"`.
pub async fn readiness(mut ctx: Context) -> Context {
    ctx.text("ready");
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[tokio::test]
    async fn probes_answer_plain_text() {
        let ctx = liveness(Context::new(Method::Get, "/healthz")).await;
        assert_eq!(ctx.response_body().as_ref(), b"ok");

        let ctx = readiness(Context::new(Method::Get, "/readyz")).await;
        assert_eq!(ctx.response_body().as_ref(), b"ready");
    }
}
