//! The route registry.
//!
//! Static paths live in an exact-match map and are answered in `O(1)` without
//! touching a cache. Everything with a `:param` or `*` goes into a
//! [`TrieRouteTree`] whose lookups, hits and misses alike, are memoized in a
//! bounded LRU cache. Not-found and error fallbacks get their own trie and
//! cache so a catch-all there can never shadow a real route.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::cache::LruCache;
use crate::error::{Error, Result, ensure_path};
use crate::method::Method;
use crate::route::{MethodMap, Route, RouteMatch, is_static, refresh_options};
use crate::trie::TrieRouteTree;

/// Verb under which not-found and error fallbacks are stored. They answer
/// every verb, so lookups into those registries always use this one.
pub const FALLBACK_METHOD: Method = Method::Get;

const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Tunables for a [`RouteTree`].
///
/// Deserializable so it can sit inside an application's own config file:
///
/// ```toml
/// [routing]
/// cache_capacity = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTreeConfig {
    /// Entries kept by each of the dynamic, not-found and error caches.
    pub cache_capacity: usize,
}

impl Default for RouteTreeConfig {
    fn default() -> Self {
        Self { cache_capacity: DEFAULT_CACHE_CAPACITY }
    }
}

type CacheKey = (Method, String);

/// A trie plus the cache in front of it.
struct CachedTree {
    tree: TrieRouteTree,
    cache: Mutex<LruCache<CacheKey, Option<Arc<RouteMatch>>>>,
}

impl CachedTree {
    fn new(capacity: usize) -> Self {
        Self {
            tree: TrieRouteTree::new(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn add(&mut self, route: Route, skip_options: bool) -> Result<()> {
        self.tree.add(route, skip_options)?;
        // a cached miss may now be a hit
        let capacity = self.cache_mut().capacity();
        *self.cache_mut() = LruCache::new(capacity);
        Ok(())
    }

    fn lookup(&self, method: Method, path: &str) -> Option<Arc<RouteMatch>> {
        let key = (method, path.to_owned());
        if let Some(cached) = self.cache().get(&key) {
            return cached;
        }

        trace!(%method, path, "route cache miss");
        let found = self.tree.match_route(method, path).map(Arc::new);
        self.cache().insert(key, found.clone());
        found
    }

    // The cache only memoizes trie lookups, so a poisoned lock still guards
    // consistent data.
    fn cache(&self) -> MutexGuard<'_, LruCache<CacheKey, Option<Arc<RouteMatch>>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_mut(&mut self) -> &mut LruCache<CacheKey, Option<Arc<RouteMatch>>> {
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self) -> usize {
        self.cache().len()
    }
}

/// The application's route registry.
///
/// Populate it through a [`Router`](crate::Router) during startup, then share
/// it (e.g. behind an `Arc`) with the request path. Matching takes `&self`
/// and is safe to call from many threads at once.
pub struct RouteTree {
    config: RouteTreeConfig,
    statics: HashMap<String, MethodMap>,
    dynamic: CachedTree,
    not_found: CachedTree,
    error: CachedTree,
}

impl RouteTree {
    pub fn new() -> Self {
        Self::build(RouteTreeConfig::default())
    }

    pub fn with_config(config: RouteTreeConfig) -> Result<Self> {
        if config.cache_capacity == 0 {
            return Err(Error::InvalidCacheCapacity);
        }
        Ok(Self::build(config))
    }

    fn build(config: RouteTreeConfig) -> Self {
        let capacity = config.cache_capacity;
        Self {
            config,
            statics: HashMap::new(),
            dynamic: CachedTree::new(capacity),
            not_found: CachedTree::new(capacity),
            error: CachedTree::new(capacity),
        }
    }

    pub fn config(&self) -> &RouteTreeConfig {
        &self.config
    }

    /// Registers a route. Static paths go to the exact-match map and have
    /// their `OPTIONS` route regenerated; everything else goes to the trie.
    pub fn add(&mut self, route: Route) -> Result<()> {
        ensure_path("RouteTree", "add", route.path())?;
        debug!(
            method = %route.method(),
            path = route.path(),
            kind = route.kind().as_str(),
            name = route.name(),
            middleware = route.middleware().len(),
            "route registered"
        );

        if !is_static(route.path()) {
            return self.dynamic.add(route, false);
        }

        let path = route.path().to_owned();
        let methods = self.statics.entry(path.clone()).or_default();
        methods.insert(route.method(), Arc::new(route));
        refresh_options(&path, methods);
        Ok(())
    }

    /// Registers a not-found fallback, typically at `{prefix}/*`.
    pub fn add_not_found(&mut self, route: Route) -> Result<()> {
        ensure_path("RouteTree", "add_not_found", route.path())?;
        debug!(path = route.path(), name = route.name(), "not-found handler registered");
        self.not_found.add(route.with_method(FALLBACK_METHOD), true)
    }

    /// Registers an error fallback, typically at `{prefix}/*`.
    pub fn add_error(&mut self, route: Route) -> Result<()> {
        ensure_path("RouteTree", "add_error", route.path())?;
        debug!(path = route.path(), name = route.name(), "error handler registered");
        self.error.add(route.with_method(FALLBACK_METHOD), true)
    }

    /// Looks up the route for a request. `None` means no route; the caller
    /// then consults [`match_not_found`](Self::match_not_found).
    pub fn match_route(&self, method: Method, path: &str) -> Option<Arc<RouteMatch>> {
        let path = if path.is_empty() { "/" } else { path };

        if let Some(methods) = self.statics.get(path) {
            if let Some(route) = methods.get(&method) {
                return Some(Arc::new(RouteMatch {
                    route: Arc::clone(route),
                    params: HashMap::new(),
                }));
            }
        }

        self.dynamic.lookup(method, path)
    }

    /// [`match_route`](Self::match_route) for an [`http::Method`]; verbs the
    /// router does not recognise never match.
    pub fn match_http(&self, method: &http::Method, path: &str) -> Option<Arc<RouteMatch>> {
        let method = Method::try_from(method).ok()?;
        self.match_route(method, path)
    }

    pub fn match_not_found(&self, path: &str) -> Option<Arc<RouteMatch>> {
        self.not_found.lookup(FALLBACK_METHOD, path)
    }

    pub fn match_error(&self, path: &str) -> Option<Arc<RouteMatch>> {
        self.error.lookup(FALLBACK_METHOD, path)
    }

    /// Drops every route and every cached lookup.
    pub fn reset(&mut self) {
        let capacity = self.config.cache_capacity;
        self.statics.clear();
        self.dynamic = CachedTree::new(capacity);
        self.not_found = CachedTree::new(capacity);
        self.error = CachedTree::new(capacity);
        info!("route tree reset");
    }

    /// Every registered route: static, dynamic, not-found, then error.
    pub fn stack(&self) -> Vec<Arc<Route>> {
        let mut out: Vec<Arc<Route>> = self
            .statics
            .values()
            .flat_map(|methods| methods.values().cloned())
            .collect();
        out.extend(self.dynamic.tree.stack());
        out.extend(self.not_found.tree.stack());
        out.extend(self.error.tree.stack());
        out
    }

    pub fn len(&self) -> usize {
        self.stack().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of memoized dynamic lookups.
    pub fn cached_lookups(&self) -> usize {
        self.dynamic.cached()
    }
}

impl Default for RouteTree {
    fn default() -> Self { Self::new() }
}
