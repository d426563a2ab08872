//! End-to-end routing behaviour through the public API.

use std::sync::Arc;
use std::thread;

use http::StatusCode;
use http::header::ALLOW;
use tsu_router::{
    Context, Error, ErasedHandler, Fingerprint, Method, Middleware, RouteKind, RouteTree, Router,
    RouterOptions,
};

async fn handler(ctx: Context) -> Context {
    ctx
}

async fn cors(ctx: Context) -> Context {
    ctx
}

fn app(tree: &mut RouteTree) -> Router<'_> {
    Router::new(tree, RouterOptions::default()).unwrap()
}

#[test]
fn static_routes_match_exactly_with_no_params() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    let paths = ["/", "/about", "/api/v1/status", "/trail", "/trail/"];
    for path in paths {
        router.get(path, handler).unwrap().post(path, handler).unwrap();
    }

    for path in paths {
        for method in [Method::Get, Method::Head, Method::Post] {
            let found = tree.match_route(method, path).unwrap();
            assert_eq!(found.route.path(), path);
            assert_eq!(found.route.method(), method);
            assert!(found.params.is_empty());
        }
    }
}

#[test]
fn trailing_and_duplicate_slashes_are_significant_for_static_paths() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.get("/trail", handler).unwrap();
    router
        .get_with("/trail/", tsu_router::RouteConfig::new(handler).name("slashed"))
        .unwrap();
    router.get("/double/slash", handler).unwrap();

    assert_eq!(tree.match_route(Method::Get, "/trail").unwrap().route.name(), "handler");
    assert_eq!(tree.match_route(Method::Get, "/trail/").unwrap().route.name(), "slashed");
    assert!(tree.match_route(Method::Get, "/double//slash").is_none());
}

#[test]
fn user_id_example() {
    let mut tree = RouteTree::new();
    app(&mut tree).get("/user/:id", handler).unwrap();

    let found = tree.match_route(Method::Get, "/user/42").unwrap();
    assert_eq!(found.param("id"), Some("42"));
    assert_eq!(found.params.len(), 1);
    assert!(tree.match_route(Method::Post, "/user/42").is_none());
}

#[test]
fn wildcard_example() {
    let mut tree = RouteTree::new();
    app(&mut tree).get("/wild/*", handler).unwrap();

    let found = tree.match_route(Method::Get, "/wild/a/b/c").unwrap();
    assert_eq!(found.param("*"), Some("a/b/c"));
    assert!(tree.match_route(Method::Post, "/wild/a/b/c").is_none());
}

#[test]
fn static_shadows_param() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.get("/shadow/static", handler).unwrap();
    router.get("/shadow/:p", handler).unwrap();

    let found = tree.match_route(Method::Get, "/shadow/static").unwrap();
    assert_eq!(found.route.path(), "/shadow/static");
    assert!(found.params.is_empty());

    let found = tree.match_route(Method::Get, "/shadow/anything-else").unwrap();
    assert_eq!(found.route.path(), "/shadow/:p");
    assert_eq!(found.param("p"), Some("anything-else"));
}

#[test]
fn params_do_not_cross_contaminate() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.get("/org/:org/repo/:repo", handler).unwrap();
    router.get("/org/:org/members", handler).unwrap();

    let repo = tree.match_route(Method::Get, "/org/acme/repo/widgets").unwrap();
    assert_eq!(repo.param("org"), Some("acme"));
    assert_eq!(repo.param("repo"), Some("widgets"));

    let members = tree.match_route(Method::Get, "/org/other/members").unwrap();
    assert_eq!(members.param("org"), Some("other"));
    assert_eq!(members.param("repo"), None);
}

#[tokio::test]
async fn synthesized_options_lists_each_verb_once() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.on(Method::Get, "/items", tsu_router::RouteConfig::new(handler)).unwrap();
    router.on(Method::Get, "/items", tsu_router::RouteConfig::new(handler)).unwrap();
    router
        .on(
            Method::Post,
            "/items",
            tsu_router::RouteConfig::new(handler)
                .middleware(Middleware::new(cors).fingerprint(Fingerprint::CORS)),
        )
        .unwrap();

    let options: Vec<_> = tree
        .stack()
        .into_iter()
        .filter(|r| r.kind() == &RouteKind::Options)
        .collect();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].middleware()[0].name(), "cors");

    let found = tree.match_route(Method::Options, "/items").unwrap();
    let ctx = found
        .route
        .handler()
        .call(Context::new(Method::Options, "/items"))
        .await
        .unwrap();
    assert_eq!(ctx.status(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.response_headers()[ALLOW], "OPTIONS, GET, POST");
}

#[test]
fn repeated_dynamic_matches_share_one_result_until_reset() {
    let mut tree = RouteTree::new();
    app(&mut tree).get("/file/:name", handler).unwrap();

    let first = tree.match_route(Method::Get, "/file/a.txt").unwrap();
    let second = tree.match_route(Method::Get, "/file/a.txt").unwrap();
    let third = tree.match_route(Method::Get, "/file/a.txt").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));

    tree.reset();
    assert!(tree.match_route(Method::Get, "/file/a.txt").is_none());
}

#[test]
fn reset_clears_routes_and_fallbacks() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.get("/static", handler).unwrap();
    router.get("/dyn/:id", handler).unwrap();
    router.on_not_found(handler).unwrap();
    router.on_error(handler).unwrap();

    assert!(tree.match_not_found("/missing").is_some());
    assert!(tree.match_error("/broken").is_some());

    tree.reset();
    assert!(tree.stack().is_empty());
    assert!(tree.match_route(Method::Get, "/static").is_none());
    assert!(tree.match_route(Method::Get, "/dyn/1").is_none());
    assert!(tree.match_not_found("/missing").is_none());
    assert!(tree.match_error("/broken").is_none());
}

#[test]
fn unknown_verbs_are_configuration_errors() {
    let err = "BREW".parse::<Method>().unwrap_err();
    assert!(matches!(err, Error::InvalidMethod { .. }));
    assert_eq!(err.to_string(), r#"Method@from_str: unsupported HTTP method "BREW""#);

    let tree = RouteTree::new();
    assert!(tree.match_http(&http::Method::TRACE, "/").is_none());
}

#[test]
fn finished_tree_is_shared_across_threads() {
    let mut tree = RouteTree::new();
    let mut router = app(&mut tree);
    router.get("/user/:id", handler).unwrap();
    router.get("/health", handler).unwrap();
    let tree = Arc::new(tree);

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for i in 0..100 {
                    let path = format!("/user/{}", (n * 100 + i) % 7);
                    let found = tree.match_http(&http::Method::GET, &path).unwrap();
                    assert_eq!(found.route.path(), "/user/:id");
                    assert!(tree.match_route(Method::Get, "/health").is_some());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(tree.cached_lookups(), 7);
}
