//! Middleware descriptors.
//!
//! A middleware is any [`Handler`] placed in front of a route. When it is
//! registered it is wrapped once into an immutable [`Middleware`] value that
//! carries its debug name, an optional description, and an optional
//! [`Fingerprint`]. The router copies these descriptors into scopes and
//! routes; it never mutates them and never calls them.
//!
//! Concrete middleware bodies (CORS, security headers, auth) live outside
//! this crate. A CORS implementation identifies itself with
//! [`Fingerprint::CORS`] so that synthesized `OPTIONS` routes can run it:
//!
//! ```rust
//! use tsu_router::{Context, Fingerprint, Middleware};
//!
//! async fn cors(ctx: Context) -> Context { ctx }
//!
//! let mw = Middleware::new(cors).fingerprint(Fingerprint::CORS);
//! assert_eq!(mw.name(), "cors");
//! assert!(mw.is_cors());
//! ```

pub mod limit;

use std::fmt;

use crate::handler::{BoxedHandler, Handler, debug_name};

/// Identity token attached to a well-known middleware.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Fingerprint(&'static str);

impl Fingerprint {
    /// The cross-origin-handling middleware.
    pub const CORS: Fingerprint = Fingerprint("tsu:cors");

    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

/// Immutable middleware descriptor.
#[derive(Clone)]
pub struct Middleware {
    name: String,
    description: Option<String>,
    fingerprint: Option<Fingerprint>,
    handler: BoxedHandler,
}

impl Middleware {
    /// Wraps a handler function. The debug name is the function's own name,
    /// or `"anonymous"` for closures.
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            name: debug_name::<H>().unwrap_or_else(|| "anonymous".to_owned()),
            description: None,
            fingerprint: None,
            handler: handler.into_boxed_handler(),
        }
    }

    /// Wraps an already-erased handler.
    pub fn from_boxed(name: impl Into<String>, handler: BoxedHandler) -> Self {
        Self { name: name.into(), description: None, fingerprint: None, handler }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn fingerprint_token(&self) -> Option<Fingerprint> { self.fingerprint }
    pub fn handler(&self) -> &BoxedHandler { &self.handler }

    pub fn is_cors(&self) -> bool {
        self.fingerprint == Some(Fingerprint::CORS)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    async fn audit(ctx: Context) -> Context {
        ctx
    }

    #[test]
    fn derives_name_from_function() {
        let mw = Middleware::new(audit);
        assert_eq!(mw.name(), "audit");
        assert!(!mw.is_cors());

        let anon = Middleware::new(|ctx: Context| async move { ctx });
        assert_eq!(anon.name(), "anonymous");
    }

    #[test]
    fn builder_attaches_metadata() {
        let mw = Middleware::new(audit)
            .named("audit-log")
            .describe("Writes an audit record")
            .fingerprint(Fingerprint::new("acme:audit"));
        assert_eq!(mw.name(), "audit-log");
        assert_eq!(mw.description(), Some("Writes an audit record"));
        assert_eq!(mw.fingerprint_token().map(Fingerprint::as_str), Some("acme:audit"));
    }

    #[test]
    fn wraps_an_erased_handler_without_rewrapping() {
        let handler = audit.into_boxed_handler();
        let mw = Middleware::from_boxed("shared", handler.clone());
        assert_eq!(mw.name(), "shared");
        assert!(std::sync::Arc::ptr_eq(mw.handler(), &handler));
    }
}
