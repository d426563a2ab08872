//! Segment trie for parameterised and wildcard routes.
//!
//! Paths are split on `/`. Each node has any number of literal children, at
//! most one parameter child (`:name`), and at most one wildcard child (`*`).
//! Lookup prefers literal over parameter over wildcard, backtracking out of a
//! branch that dead-ends. A wildcard swallows the rest of the path, so nothing
//! below it is ever consulted.
//!
//! Empty segments (leading, trailing, or doubled slashes) are skipped both
//! when inserting and when matching.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, ensure_path};
use crate::method::Method;
use crate::route::{MethodMap, Route, RouteMatch, refresh_options};

/// Key under which a wildcard capture is bound.
pub const WILDCARD_KEY: &str = "*";

#[derive(Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    param: Option<ParamChild>,
    wildcard: Option<Box<TrieNode>>,
    methods: MethodMap,
}

struct ParamChild {
    name: String,
    node: Box<TrieNode>,
}

impl TrieNode {
    fn collect(&self, out: &mut Vec<Arc<Route>>) {
        out.extend(self.methods.values().cloned());
        for child in self.children.values() {
            child.collect(out);
        }
        if let Some(param) = &self.param {
            param.node.collect(out);
        }
        if let Some(wildcard) = &self.wildcard {
            wildcard.collect(out);
        }
    }
}

/// A prefix tree over path segments.
#[derive(Default)]
pub struct TrieRouteTree {
    root: TrieNode,
}

impl TrieRouteTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `route` at its path, replacing any route with the same verb.
    ///
    /// Unless `skip_options` is set, the node's `OPTIONS` route is rebuilt
    /// from every verb now registered there.
    pub fn add(&mut self, route: Route, skip_options: bool) -> Result<()> {
        ensure_path("TrieRouteTree", "add", route.path())?;

        let mut node = &mut self.root;
        for segment in route.path().split('/') {
            if segment.is_empty() {
                continue;
            }
            if segment == WILDCARD_KEY {
                node = node.wildcard.get_or_insert_with(Box::default).as_mut();
                break;
            }
            node = if let Some(name) = segment.strip_prefix(':') {
                let param = node.param.get_or_insert_with(|| ParamChild {
                    name: name.to_owned(),
                    node: Box::default(),
                });
                param.node.as_mut()
            } else {
                node.children.entry(segment.to_owned()).or_default()
            };
        }

        let path = route.path().to_owned();
        node.methods.insert(route.method(), Arc::new(route));
        if !skip_options {
            refresh_options(&path, &mut node.methods);
        }
        Ok(())
    }

    /// Finds the route for `method` at `path`, capturing parameters.
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let segments: Vec<&str> = path.split('/').collect();
        let mut params = HashMap::new();
        let route = search(&self.root, &segments, 0, method, &mut params)?;
        Some(RouteMatch { route: Arc::clone(route), params })
    }

    /// Every route in the tree, synthesized `OPTIONS` routes included.
    pub fn stack(&self) -> Vec<Arc<Route>> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }
}

fn search<'t>(
    node: &'t TrieNode,
    segments: &[&str],
    index: usize,
    method: Method,
    params: &mut HashMap<String, String>,
) -> Option<&'t Arc<Route>> {
    let Some(&segment) = segments.get(index) else {
        return node.methods.get(&method);
    };
    if segment.is_empty() {
        return search(node, segments, index + 1, method, params);
    }

    if let Some(child) = node.children.get(segment) {
        if let Some(route) = search(child, segments, index + 1, method, params) {
            return Some(route);
        }
    }

    if let Some(param) = &node.param {
        let shadowed = params.insert(param.name.clone(), segment.to_owned());
        if let Some(route) = search(&param.node, segments, index + 1, method, params) {
            return Some(route);
        }
        match shadowed {
            Some(previous) => params.insert(param.name.clone(), previous),
            None => params.remove(&param.name),
        };
    }

    if let Some(wildcard) = &node.wildcard {
        let route = wildcard.methods.get(&method);
        if route.is_some() {
            params.insert(WILDCARD_KEY.to_owned(), segments[index..].join("/"));
        }
        return route;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::route::RouteKind;

    async fn ok(ctx: Context) -> Context {
        ctx
    }

    fn tree(routes: &[(Method, &str)]) -> TrieRouteTree {
        let mut tree = TrieRouteTree::new();
        for (method, path) in routes {
            tree.add(Route::new(*method, *path, ok), false).unwrap();
        }
        tree
    }

    #[test]
    fn captures_parameters() {
        let tree = tree(&[(Method::Get, "/user/:id")]);
        let found = tree.match_route(Method::Get, "/user/42").unwrap();
        assert_eq!(found.route.path(), "/user/:id");
        assert_eq!(found.param("id"), Some("42"));
        assert!(tree.match_route(Method::Post, "/user/42").is_none());
    }

    #[test]
    fn literal_beats_param_beats_wildcard() {
        let tree = tree(&[
            (Method::Get, "/shadow/static"),
            (Method::Get, "/shadow/:p"),
            (Method::Get, "/shadow/*"),
        ]);

        let found = tree.match_route(Method::Get, "/shadow/static").unwrap();
        assert_eq!(found.route.path(), "/shadow/static");
        assert!(found.params.is_empty());

        let found = tree.match_route(Method::Get, "/shadow/other").unwrap();
        assert_eq!(found.route.path(), "/shadow/:p");
        assert_eq!(found.param("p"), Some("other"));

        let found = tree.match_route(Method::Get, "/shadow/a/b").unwrap();
        assert_eq!(found.route.path(), "/shadow/*");
        assert_eq!(found.param("*"), Some("a/b"));
        assert_eq!(found.param("p"), None);
    }

    #[test]
    fn backtracking_does_not_leak_bindings() {
        let tree = tree(&[
            (Method::Get, "/a/:x/deep"),
            (Method::Get, "/a/b/c"),
            (Method::Get, "/a/*"),
        ]);

        // literal branch a/b dead-ends on "zzz", param branch dead-ends too,
        // and the wildcard must not see the stale `x`.
        let found = tree.match_route(Method::Get, "/a/b/zzz").unwrap();
        assert_eq!(found.route.path(), "/a/*");
        assert_eq!(found.param("x"), None);
        assert_eq!(found.param("*"), Some("b/zzz"));

        let found = tree.match_route(Method::Get, "/a/b/deep").unwrap();
        assert_eq!(found.route.path(), "/a/:x/deep");
        assert_eq!(found.param("x"), Some("b"));
    }

    #[test]
    fn wildcard_is_terminal_and_verb_specific() {
        let tree = tree(&[(Method::Get, "/wild/*")]);
        let found = tree.match_route(Method::Get, "/wild/a/b/c").unwrap();
        assert_eq!(found.param("*"), Some("a/b/c"));
        assert!(tree.match_route(Method::Post, "/wild/a/b/c").is_none());
    }

    #[test]
    fn first_param_name_wins_at_a_position() {
        let tree = tree(&[(Method::Get, "/item/:id"), (Method::Delete, "/item/:key")]);
        let found = tree.match_route(Method::Delete, "/item/9").unwrap();
        assert_eq!(found.route.path(), "/item/:key");
        assert_eq!(found.param("id"), Some("9"));
        assert_eq!(found.param("key"), None);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let tree = tree(&[(Method::Get, "/user/:id")]);
        let found = tree.match_route(Method::Get, "/user//42/").unwrap();
        assert_eq!(found.param("id"), Some("42"));
    }

    #[test]
    fn options_aggregates_verbs_unless_skipped() {
        let tree = tree(&[
            (Method::Get, "/doc/:id"),
            (Method::Get, "/doc/:id"),
            (Method::Post, "/doc/:id"),
        ]);
        let options = tree.match_route(Method::Options, "/doc/1").unwrap();
        assert_eq!(options.route.kind(), &RouteKind::Options);
        assert_eq!(tree.stack().len(), 3);

        let mut fallback = TrieRouteTree::new();
        fallback.add(Route::new(Method::Get, "/*", ok), true).unwrap();
        assert!(fallback.match_route(Method::Options, "/x").is_none());
        assert_eq!(fallback.stack().len(), 1);
    }

    #[test]
    fn rejects_relative_paths() {
        let mut tree = TrieRouteTree::new();
        assert!(tree.add(Route::new(Method::Get, "user/:id", ok), false).is_err());
    }
}
