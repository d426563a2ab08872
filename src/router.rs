//! Route registration scopes.
//!
//! A [`Router`] is a scope: a path prefix plus the middleware, timeout,
//! body-parser options and rate limiter every route registered through it
//! inherits. It owns no routes itself; every registration lands in the
//! [`RouteTree`] it borrows.
//!
//! [`Router::group`] forks a child scope. The child starts from a *copy* of
//! the parent's state, so nothing the child adds ever leaks back upward:
//!
//! ```rust
//! use tsu_router::{Context, Method, Middleware, RouteTree, Router, RouterOptions};
//!
//! async fn list_users(ctx: Context) -> Context { ctx }
//! async fn get_user(ctx: Context) -> Context { ctx }
//! async fn auth(ctx: Context) -> Context { ctx }
//!
//! let mut tree = RouteTree::new();
//! let mut app = Router::new(&mut tree, RouterOptions::default()).unwrap();
//! app.group("/api", |api| {
//!     api.use_middleware(Middleware::new(auth));
//!     api.get("/users", list_users)?;
//!     api.get("/users/:id", get_user)?;
//!     Ok(())
//! }).unwrap();
//! assert!(app.middleware().is_empty());
//!
//! let found = tree.match_route(Method::Get, "/api/users/7").unwrap();
//! assert_eq!(found.param("id"), Some("7"));
//! assert_eq!(found.route.middleware()[0].name(), "auth");
//! ```

use serde_json::Value;
use tracing::trace;

use crate::body_parser::BodyParserConfig;
use crate::builder::RouteBuilder;
use crate::error::{Error, Result, ensure_path};
use crate::handler::{BoxedHandler, Handler, debug_name};
use crate::method::Method;
use crate::middleware::Middleware;
use crate::middleware::limit::{LimitSpec, SharedLimiter, limit_middleware};
use crate::route::{Route, RouteKind};
use crate::tree::RouteTree;

// ── Options ───────────────────────────────────────────────────────────────────

/// Settings for a root [`Router`].
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Prefix for every route. Empty, or starting with `/`.
    pub path: String,
    /// Request timeout in milliseconds. Must be positive when set.
    pub timeout: Option<u64>,
    pub rate_limiter: Option<SharedLimiter>,
    /// `Value::Null` or a JSON object.
    pub body_parser: Value,
    pub middleware: Vec<Middleware>,
}

/// Per-group overrides for [`Router::group_with`]. Anything left unset is
/// inherited from the parent scope.
#[derive(Clone, Default)]
pub struct GroupOptions {
    timeout: Option<Option<u64>>,
    rate_limiter: Option<Option<SharedLimiter>>,
    body_parser: Option<Value>,
}

impl GroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` clears the inherited timeout.
    pub fn timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `None` detaches the group from the inherited limiter.
    pub fn rate_limiter(mut self, limiter: Option<SharedLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// `Value::Null` clears the inherited config.
    pub fn body_parser(mut self, config: Value) -> Self {
        self.body_parser = Some(config);
        self
    }
}

/// A handler plus per-registration overrides, for the `*_with` methods.
#[derive(Clone)]
pub struct RouteConfig {
    handler: BoxedHandler,
    handler_name: Option<String>,
    name: Option<String>,
    description: Option<String>,
    timeout: Option<Option<u64>>,
    kind: Option<RouteKind>,
    meta: Option<Value>,
    middleware: Vec<Middleware>,
    body_parser: Option<Value>,
}

impl RouteConfig {
    pub fn new<H: Handler>(handler: H) -> Self {
        Self::from_boxed(handler.into_boxed_handler(), debug_name::<H>())
    }

    fn from_boxed(handler: BoxedHandler, handler_name: Option<String>) -> Self {
        Self {
            handler,
            handler_name,
            name: None,
            description: None,
            timeout: None,
            kind: None,
            meta: None,
            middleware: Vec::new(),
            body_parser: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the scope timeout; `None` registers the route without one.
    pub fn timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn kind(mut self, kind: RouteKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Appends middleware that runs after the scope's own.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Overrides the scope body-parser config. A value that is neither null
    /// nor an object is ignored and the scope config applies.
    pub fn body_parser(mut self, config: Value) -> Self {
        self.body_parser = Some(config);
        self
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// A registration scope over a borrowed [`RouteTree`].
pub struct Router<'t> {
    tree: &'t mut RouteTree,
    path: String,
    timeout: Option<u64>,
    rate_limiter: Option<SharedLimiter>,
    body_parser: Option<BodyParserConfig>,
    middleware: Vec<Middleware>,
}

impl<'t> Router<'t> {
    pub fn new(tree: &'t mut RouteTree, options: RouterOptions) -> Result<Self> {
        if !options.path.is_empty() {
            ensure_path("Router", "new", &options.path)?;
        }
        check_timeout("new", options.timeout)?;
        let body_parser = BodyParserConfig::from_value("Router", "new", options.body_parser)?;

        Ok(Self {
            tree,
            path: options.path,
            timeout: options.timeout,
            rate_limiter: options.rate_limiter,
            body_parser,
            middleware: options.middleware,
        })
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn timeout(&self) -> Option<u64> { self.timeout }
    pub fn middleware(&self) -> &[Middleware] { &self.middleware }
    pub fn body_parser(&self) -> Option<&BodyParserConfig> { self.body_parser.as_ref() }

    /// Appends middleware for every route registered afterwards in this
    /// scope and its future children.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a rate-limit middleware minted by this scope's limiter.
    pub fn limit(&mut self, spec: impl Into<LimitSpec>) -> Result<&mut Self> {
        let mw = limit_middleware("Router", self.rate_limiter.as_ref(), spec.into())?;
        Ok(self.use_middleware(mw))
    }

    /// Runs `f` against a child scope at `{prefix}{path}` that inherits
    /// everything from this one.
    pub fn group<F>(&mut self, path: &str, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router<'_>) -> Result<()>,
    {
        self.group_with(path, GroupOptions::default(), f)
    }

    /// [`group`](Self::group) with overrides for the child scope.
    pub fn group_with<F>(&mut self, path: &str, options: GroupOptions, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Router<'_>) -> Result<()>,
    {
        ensure_path("Router", "group", path)?;

        let timeout = options.timeout.unwrap_or(self.timeout);
        check_timeout("group", timeout)?;
        let body_parser = match options.body_parser {
            Some(value) => BodyParserConfig::from_value("Router", "group", value)?,
            None => self.body_parser.clone(),
        };

        let mut child = Router {
            tree: &mut *self.tree,
            path: format!("{}{path}", self.path),
            timeout,
            rate_limiter: options.rate_limiter.unwrap_or_else(|| self.rate_limiter.clone()),
            body_parser,
            middleware: self.middleware.clone(),
        };
        trace!(path = child.path.as_str(), middleware = child.middleware.len(), "group scope opened");
        f(&mut child)?;
        Ok(self)
    }

    /// Collects per-verb handlers for one path with a [`RouteBuilder`], then
    /// registers them.
    pub fn route<F>(&mut self, path: &str, f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut RouteBuilder) -> Result<()>,
    {
        self.full_path("route", path)?;

        let mut builder = RouteBuilder::new(self.rate_limiter.clone(), self.body_parser.clone());
        f(&mut builder)?;

        for entry in builder.stack() {
            let body_parser = match entry.body_parser {
                Some(config) => Value::Object(config.as_map().clone()),
                None => Value::Null,
            };
            let config = RouteConfig::from_boxed(entry.handler, entry.handler_name)
                .body_parser(body_parser);
            self.register("route", &entry.methods, path, entry.middleware, config)?;
        }
        Ok(self)
    }

    // ── Verbs ────────────────────────────────────────────────────────────────

    /// Registers `GET` and `HEAD`.
    pub fn get<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        self.get_with(path, RouteConfig::new(handler))
    }

    pub fn post<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        self.post_with(path, RouteConfig::new(handler))
    }

    pub fn put<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        self.put_with(path, RouteConfig::new(handler))
    }

    pub fn patch<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        self.patch_with(path, RouteConfig::new(handler))
    }

    pub fn delete<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        self.delete_with(path, RouteConfig::new(handler))
    }

    pub fn get_with(&mut self, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("get", &[Method::Get, Method::Head], path, Vec::new(), config)?;
        Ok(self)
    }

    pub fn post_with(&mut self, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("post", &[Method::Post], path, Vec::new(), config)?;
        Ok(self)
    }

    pub fn put_with(&mut self, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("put", &[Method::Put], path, Vec::new(), config)?;
        Ok(self)
    }

    pub fn patch_with(&mut self, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("patch", &[Method::Patch], path, Vec::new(), config)?;
        Ok(self)
    }

    pub fn delete_with(&mut self, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("delete", &[Method::Delete], path, Vec::new(), config)?;
        Ok(self)
    }

    /// Registers exactly one verb, with no implicit `HEAD` for `GET`.
    pub fn on(&mut self, method: Method, path: &str, config: RouteConfig) -> Result<&mut Self> {
        self.register("on", &[method], path, Vec::new(), config)?;
        Ok(self)
    }

    /// `GET` + `HEAD` route tagged [`RouteKind::Health`].
    pub fn health<H: Handler>(&mut self, path: &str, handler: H) -> Result<&mut Self> {
        let config = RouteConfig::new(handler)
            .kind(RouteKind::Health)
            .description("Healthcheck");
        self.get_with(path, config)
    }

    // ── Fallbacks ────────────────────────────────────────────────────────────

    /// Catch-all for unmatched requests under this scope's prefix.
    pub fn on_not_found<H: Handler>(&mut self, handler: H) -> Result<&mut Self> {
        let route = self.fallback(handler, RouteKind::NotFound, "NOTFOUND");
        self.tree.add_not_found(route)?;
        Ok(self)
    }

    /// Catch-all for failed requests under this scope's prefix.
    pub fn on_error<H: Handler>(&mut self, handler: H) -> Result<&mut Self> {
        let route = self.fallback(handler, RouteKind::Error, "ERROR");
        self.tree.add_error(route)?;
        Ok(self)
    }

    fn fallback<H: Handler>(&self, handler: H, kind: RouteKind, label: &str) -> Route {
        let path = format!("{}/*", self.path);
        let name = debug_name::<H>().unwrap_or_else(|| format!("{label}_{path}"));
        Route::new(Method::Get, path, handler)
            .with_kind(kind)
            .with_name(name)
            .with_middleware(self.middleware.clone())
            .with_timeout(self.timeout)
            .with_body_parser(self.body_parser.clone())
    }

    // ── Registration ─────────────────────────────────────────────────────────

    fn register(
        &mut self,
        operation: &'static str,
        methods: &[Method],
        path: &str,
        call_site: Vec<Middleware>,
        config: RouteConfig,
    ) -> Result<()> {
        let full_path = self.full_path(operation, path)?;

        let timeout = match config.timeout {
            Some(timeout) => {
                check_timeout(operation, timeout)?;
                timeout
            }
            None => self.timeout,
        };

        let body_parser = match config.body_parser {
            Some(value) => BodyParserConfig::from_value("Router", operation, value)
                .unwrap_or_else(|_| self.body_parser.clone()),
            None => self.body_parser.clone(),
        };

        let mut middleware = self.middleware.clone();
        middleware.extend(call_site);
        middleware.extend(config.middleware);

        for &method in methods {
            let name = config
                .name
                .clone()
                .or_else(|| config.handler_name.clone())
                .unwrap_or_else(|| format!("{method}_{full_path}"));
            let route = Route::from_boxed(method, full_path.clone(), config.handler.clone())
                .with_name(name)
                .with_description(config.description.clone())
                .with_kind(config.kind.clone().unwrap_or(RouteKind::Std))
                .with_meta(config.meta.clone())
                .with_timeout(timeout)
                .with_body_parser(body_parser.clone())
                .with_middleware(middleware.clone());
            self.tree.add(route)?;
        }
        Ok(())
    }

    /// Joins `path` onto the scope prefix. Inside a prefixed scope an empty
    /// `path` names the scope root itself; otherwise it must start with `/`.
    fn full_path(&self, operation: &'static str, path: &str) -> Result<String> {
        if !path.is_empty() || self.path.is_empty() {
            ensure_path("Router", operation, path)?;
        }
        let full = format!("{}{path}", self.path);
        ensure_path("Router", operation, &full)?;
        Ok(full)
    }
}

fn check_timeout(operation: &'static str, timeout: Option<u64>) -> Result<()> {
    match timeout {
        Some(0) => Err(Error::InvalidTimeout { component: "Router", operation }),
        _ => Ok(()),
    }
}
