//! Registered routes and match results.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use http::header::ALLOW;
use http::{HeaderValue, StatusCode};
use serde_json::Value;

use crate::body_parser::BodyParserConfig;
use crate::context::Context;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::Middleware;

/// What a route is for. Carried as metadata for the execution layer and for
/// introspection; matching ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Std,
    Options,
    NotFound,
    Error,
    Health,
    Custom(String),
}

impl RouteKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Std => "std",
            Self::Options => "options",
            Self::NotFound => "notfound",
            Self::Error => "error",
            Self::Health => "health",
            Self::Custom(kind) => kind,
        }
    }
}

/// A route as stored in a tree node.
///
/// Once a route is inserted it sits behind an `Arc` and is never changed;
/// registering the same (path, method) again replaces it outright.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    handler: BoxedHandler,
    middleware: Vec<Middleware>,
    kind: RouteKind,
    timeout: Option<u64>,
    body_parser: Option<BodyParserConfig>,
    name: String,
    description: Option<String>,
    meta: Option<Value>,
}

impl Route {
    /// A `Std` route with no middleware, named `{METHOD}_{path}`.
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler) -> Self {
        Self::from_boxed(method, path, handler.into_boxed_handler())
    }

    pub fn from_boxed(method: Method, path: impl Into<String>, handler: BoxedHandler) -> Self {
        let path = path.into();
        Self {
            method,
            name: format!("{method}_{path}"),
            path,
            handler,
            middleware: Vec::new(),
            kind: RouteKind::Std,
            timeout: None,
            body_parser: None,
            description: None,
            meta: None,
        }
    }

    pub fn with_middleware(mut self, middleware: Vec<Middleware>) -> Self {
        self.middleware = middleware;
        self
    }

    pub fn with_kind(mut self, kind: RouteKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_body_parser(mut self, body_parser: Option<BodyParserConfig>) -> Self {
        self.body_parser = body_parser;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_meta(mut self, meta: Option<Value>) -> Self {
        self.meta = meta;
        self
    }

    pub(crate) fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn handler(&self) -> &BoxedHandler { &self.handler }
    pub fn middleware(&self) -> &[Middleware] { &self.middleware }
    pub fn kind(&self) -> &RouteKind { &self.kind }
    pub fn timeout(&self) -> Option<u64> { self.timeout }
    pub fn body_parser(&self) -> Option<&BodyParserConfig> { self.body_parser.as_ref() }
    pub fn name(&self) -> &str { &self.name }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn meta(&self) -> Option<&Value> { self.meta.as_ref() }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("middleware", &self.middleware)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// The routes registered at one path, keyed by verb.
///
/// A `BTreeMap` keeps the `Allow` list and introspection output in a stable
/// verb order.
pub(crate) type MethodMap = BTreeMap<Method, Arc<Route>>;

/// A successful lookup: the route plus the parameters captured on the way.
#[derive(Debug)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Rebuilds the synthetic `OPTIONS` route for the verbs currently at `path`.
///
/// The `Allow` list is `OPTIONS` followed by every other registered verb, in
/// [`Method`] declaration order. Siblings are scanned in that same verb order
/// (not registration order), and the first middleware fingerprinted as CORS
/// is adopted so that preflight requests still get their headers.
pub(crate) fn refresh_options(path: &str, methods: &mut MethodMap) {
    let mut allow = vec![Method::Options.as_str()];
    let mut cors = None;
    for (method, route) in methods.iter() {
        if *method == Method::Options {
            continue;
        }
        allow.push(method.as_str());
        if cors.is_none() {
            cors = route.middleware().iter().find(|mw| mw.is_cors()).cloned();
        }
    }

    let allow = HeaderValue::from_str(&allow.join(", ")).ok();
    let route = Route::new(Method::Options, path, options_handler(allow))
        .with_kind(RouteKind::Options)
        .with_name(format!("OPTIONS_{path}"))
        .with_description(Some("Auto-generated OPTIONS handler".to_owned()))
        .with_middleware(cors.into_iter().collect());
    methods.insert(Method::Options, Arc::new(route));
}

fn options_handler(allow: Option<HeaderValue>) -> impl Handler {
    move |mut ctx: Context| {
        let allow = allow.clone();
        async move {
            if let Some(allow) = allow {
                ctx.set_header(ALLOW, allow);
            }
            ctx.set_status(StatusCode::NO_CONTENT);
            ctx
        }
    }
}

/// `true` when the path has neither parameter nor wildcard segments.
pub(crate) fn is_static(path: &str) -> bool {
    !path.contains(':') && !path.contains('*')
}
