//! Per-path route builder used by [`Router::route`](crate::Router::route).
//!
//! Every verb registration snapshots the middleware and body-parser override
//! as they stand at that moment, so later `use_middleware` calls only affect
//! verbs registered after them:
//!
//! ```rust
//! use tsu_router::{Context, Middleware, RouteTree, Router, RouterOptions};
//!
//! async fn list(ctx: Context) -> Context { ctx }
//! async fn create(ctx: Context) -> Context { ctx }
//! async fn auth(ctx: Context) -> Context { ctx }
//!
//! let mut tree = RouteTree::new();
//! let mut router = Router::new(&mut tree, RouterOptions::default()).unwrap();
//! router.route("/posts", |r| {
//!     r.get(list);
//!     r.use_middleware(Middleware::new(auth));
//!     r.post(create);
//!     Ok(())
//! }).unwrap();
//! ```

use std::collections::BTreeMap;

use crate::body_parser::BodyParserConfig;
use crate::error::Result;
use crate::handler::{BoxedHandler, Handler, debug_name};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::middleware::limit::{LimitSpec, SharedLimiter, limit_middleware};

/// One verb registration captured by a [`RouteBuilder`].
#[derive(Clone)]
pub struct RouteEntry {
    pub methods: Vec<Method>,
    pub handler: BoxedHandler,
    pub handler_name: Option<String>,
    pub middleware: Vec<Middleware>,
    pub body_parser: Option<BodyParserConfig>,
}

/// Accumulates verb handlers for a single path.
pub struct RouteBuilder {
    limiter: Option<SharedLimiter>,
    middleware: Vec<Middleware>,
    body_parser: Option<BodyParserConfig>,
    entries: BTreeMap<Method, RouteEntry>,
}

impl RouteBuilder {
    pub fn new(limiter: Option<SharedLimiter>, body_parser: Option<BodyParserConfig>) -> Self {
        Self {
            limiter,
            middleware: Vec::new(),
            body_parser,
            entries: BTreeMap::new(),
        }
    }

    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a rate-limit middleware minted by the inherited limiter.
    pub fn limit(&mut self, spec: impl Into<LimitSpec>) -> Result<&mut Self> {
        let mw = limit_middleware("Route", self.limiter.as_ref(), spec.into())?;
        Ok(self.use_middleware(mw))
    }

    /// Overrides the body-parser config for verbs registered after this call.
    pub fn body_parser(&mut self, config: Option<BodyParserConfig>) -> &mut Self {
        self.body_parser = config;
        self
    }

    /// Registers `GET` and `HEAD`.
    pub fn get<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.store(&[Method::Get, Method::Head], handler)
    }

    pub fn post<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.store(&[Method::Post], handler)
    }

    pub fn put<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.store(&[Method::Put], handler)
    }

    pub fn patch<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.store(&[Method::Patch], handler)
    }

    pub fn delete<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.store(&[Method::Delete], handler)
    }

    fn store<H: Handler>(&mut self, methods: &[Method], handler: H) -> &mut Self {
        let entry = RouteEntry {
            methods: methods.to_vec(),
            handler_name: debug_name::<H>(),
            handler: handler.into_boxed_handler(),
            middleware: self.middleware.clone(),
            body_parser: self.body_parser.clone(),
        };
        // repeated verbs overwrite
        self.entries.insert(methods[0], entry);
        self
    }

    /// The registrations, ordered by verb.
    pub fn stack(&self) -> Vec<RouteEntry> {
        self.entries.values().cloned().collect()
    }
}
