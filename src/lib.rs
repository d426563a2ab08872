//! # tsu-router
//!
//! The routing and dispatch core of the tsu HTTP framework. It answers one
//! question: *which route, with which middleware and settings, handles this
//! request?* Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The core does no I/O, runs no handlers, reads no bodies, and enforces no
//! timeouts. Those belong to the runtime adapter that sits on top. What's
//! left is the part that has to be fast and has to be right:
//!
//! - **Static routes**: exact-match hashmap, `O(1)`, no cache involved
//! - **Dynamic routes**: segment trie with `:param` and `*` wildcard,
//!   literal > parameter > wildcard precedence, memoized in a bounded LRU
//! - **Fallbacks**: separate not-found and error tries, scoped by prefix
//! - **`OPTIONS`**: generated per path from the registered verbs, running
//!   the CORS middleware if a sibling route carries one
//! - **Scopes**: [`Router::group`] forks copy-on-write scopes, and children
//!   never affect their parent
//!
//! ## Quick start
//!
//! ```rust
//! use tsu_router::{Context, Method, RouteTree, Router, RouterOptions};
//!
//! async fn get_user(mut ctx: Context) -> Context {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     ctx.json(format!(r#"{{"id":"{id}"}}"#));
//!     ctx
//! }
//!
//! async fn create_user(ctx: Context) -> Context { ctx }
//!
//! let mut tree = RouteTree::new();
//! let mut app = Router::new(&mut tree, RouterOptions::default()).unwrap();
//! app.get("/users/:id", get_user).unwrap()
//!    .post("/users", create_user).unwrap();
//!
//! let found = tree.match_route(Method::Get, "/users/42").unwrap();
//! assert_eq!(found.route.name(), "get_user");
//! assert_eq!(found.param("id"), Some("42"));
//! assert!(tree.match_route(Method::Delete, "/users/42").is_none());
//! ```

mod body_parser;
mod builder;
mod cache;
mod context;
mod error;
mod handler;
mod method;
mod route;
mod router;
mod tree;
mod trie;

pub mod health;
pub mod middleware;

pub use body_parser::BodyParserConfig;
pub use builder::{RouteBuilder, RouteEntry};
pub use context::Context;
pub use error::{Error, Result};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, IntoOutcome, Outcome};
pub use method::Method;
pub use middleware::limit::{LimitSpec, RateLimiter, SharedLimiter};
pub use middleware::{Fingerprint, Middleware};
pub use route::{Route, RouteKind, RouteMatch};
pub use router::{GroupOptions, RouteConfig, Router, RouterOptions};
pub use tree::{FALLBACK_METHOD, RouteTree, RouteTreeConfig};
pub use trie::{TrieRouteTree, WILDCARD_KEY};
