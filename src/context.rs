//! Per-request context handed to middleware and handlers.
//!
//! The routing core never looks inside a [`Context`]; it only fixes the shape
//! of the callables it stores. Runtime adapters build one per request, fill
//! in the captured path parameters from a [`RouteMatch`](crate::RouteMatch),
//! and thread it through the middleware chain.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::method::Method;

/// An in-flight request together with the response being built for it.
#[derive(Debug, Clone)]
pub struct Context {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Bytes,
}

impl Context {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Request header lookup. Header names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `ctx.param("id")` on `/users/42` returns `Some("42")`.
    /// A wildcard capture is available under `"*"`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    // ── Response side ────────────────────────────────────────────────────────

    pub fn status(&self) -> StatusCode { self.status }
    pub fn response_headers(&self) -> &HeaderMap { &self.response_headers }
    pub fn response_body(&self) -> &Bytes { &self.response_body }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Sets a response header, replacing any previous value.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// `200 OK` with a `text/plain; charset=utf-8` body.
    pub fn text(&mut self, body: impl Into<String>) {
        self.finish("text/plain; charset=utf-8", Bytes::from(body.into()));
    }

    /// `200 OK` with an `application/json` body. Bytes come from your serialiser.
    pub fn json(&mut self, body: impl Into<Bytes>) {
        self.finish("application/json", body.into());
    }

    fn finish(&mut self, content_type: &'static str, body: Bytes) {
        self.response_headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.response_body = body;
    }
}
