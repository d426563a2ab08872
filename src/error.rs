//! Unified error type.

use thiserror::Error;

/// A registration-time configuration error.
///
/// Every variant renders as `Component@operation: reason` so a failed startup
/// points straight at the call that was rejected. Matching never produces an
/// `Error`: an unmatched request is `None`, and the caller falls back to its
/// not-found or error chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A route or scope path that does not begin with `/`.
    #[error("{component}@{operation}: path must start with '/', got {path:?}")]
    InvalidPath {
        component: &'static str,
        operation: &'static str,
        path: String,
    },

    /// A verb outside `GET, HEAD, POST, PUT, PATCH, DELETE, OPTIONS`.
    #[error("{component}@{operation}: unsupported HTTP method {method:?}")]
    InvalidMethod {
        component: &'static str,
        operation: &'static str,
        method: String,
    },

    /// A timeout of zero.
    #[error("{component}@{operation}: timeout must be a positive integer")]
    InvalidTimeout {
        component: &'static str,
        operation: &'static str,
    },

    /// A body-parser config that is neither absent nor a JSON object.
    #[error("{component}@{operation}: body parser config must be null or an object")]
    InvalidBodyParser {
        component: &'static str,
        operation: &'static str,
    },

    /// `limit()` called on a scope with no rate limiter.
    #[error("{component}@limit: no rate limiter configured")]
    LimiterMissing { component: &'static str },

    /// `limit()` called with a non-positive fixed limit.
    #[error("{component}@limit: limit must be a positive integer or a function")]
    InvalidLimit { component: &'static str },

    /// A cache capacity of zero.
    #[error("RouteTree@with_config: cache capacity must be at least 1")]
    InvalidCacheCapacity,
}

/// Result alias for registration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks the one structural rule every registered path obeys.
pub(crate) fn ensure_path(
    component: &'static str,
    operation: &'static str,
    path: &str,
) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(Error::InvalidPath { component, operation, path: path.to_owned() })
    }
}
