//! Rate-limit seam.
//!
//! Strategies (fixed window, sliding window, token bucket) and their stores
//! are external. The router only needs something that turns a limit into a
//! [`Middleware`]; the limiter is free to defer connecting to its store until
//! that middleware first runs, since the environment it needs does not exist
//! yet while routes are being registered.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::middleware::Middleware;

/// A request limit: a fixed count, or one computed per request.
#[derive(Clone)]
pub enum LimitSpec {
    Fixed(u32),
    Dynamic(Arc<dyn Fn(&Context) -> u32 + Send + Sync>),
}

impl LimitSpec {
    pub fn dynamic(f: impl Fn(&Context) -> u32 + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(f))
    }
}

impl From<u32> for LimitSpec {
    fn from(n: u32) -> Self {
        Self::Fixed(n)
    }
}

impl fmt::Debug for LimitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A rate limiter that can mint middleware for a given limit.
pub trait RateLimiter: Send + Sync {
    fn limit(&self, spec: LimitSpec) -> Middleware;
}

/// Shared handle to a limiter, inherited by nested scopes.
pub type SharedLimiter = Arc<dyn RateLimiter>;

/// Validates `spec` and asks `limiter` for the corresponding middleware.
pub(crate) fn limit_middleware(
    component: &'static str,
    limiter: Option<&SharedLimiter>,
    spec: LimitSpec,
) -> Result<Middleware> {
    let limiter = limiter.ok_or(Error::LimiterMissing { component })?;
    if matches!(spec, LimitSpec::Fixed(0)) {
        return Err(Error::InvalidLimit { component });
    }
    Ok(limiter.limit(spec))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    impl RateLimiter for Stub {
        fn limit(&self, spec: LimitSpec) -> Middleware {
            let name = match spec {
                LimitSpec::Fixed(n) => format!("limit_{n}"),
                LimitSpec::Dynamic(_) => "limit_dynamic".to_owned(),
            };
            Middleware::new(|ctx: Context| async move { ctx }).named(name)
        }
    }

    #[test]
    fn requires_limiter_and_positive_limit() {
        let limiter: SharedLimiter = Arc::new(Stub);

        let err = limit_middleware("Router", None, 10u32.into()).unwrap_err();
        assert_eq!(err, Error::LimiterMissing { component: "Router" });

        let err = limit_middleware("Route", Some(&limiter), 0u32.into()).unwrap_err();
        assert_eq!(err, Error::InvalidLimit { component: "Route" });

        let mw = limit_middleware("Router", Some(&limiter), 10u32.into()).unwrap();
        assert_eq!(mw.name(), "limit_10");

        let mw = limit_middleware("Router", Some(&limiter), LimitSpec::dynamic(|_| 5)).unwrap();
        assert_eq!(mw.name(), "limit_dynamic");
    }
}
