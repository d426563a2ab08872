//! Minimal tsu-router example: a small API, a route builder, fallbacks and
//! health checks, then a few lookups the way a runtime adapter would do them.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic

use http::StatusCode;
use serde_json::json;
use tsu_router::{
    Context, ErasedHandler, Fingerprint, Method, Middleware, RouteTree, Router, RouterOptions,
    health,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> tsu_router::Result<()> {
    tracing_subscriber::fmt::init();

    let mut tree = RouteTree::new();
    let options = RouterOptions {
        timeout: Some(5_000),
        body_parser: json!({ "limit": "1mb" }),
        ..Default::default()
    };
    let mut app = Router::new(&mut tree, options)?;

    app.health("/healthz", health::liveness)?
        .health("/readyz", health::readiness)?
        .on_not_found(not_found)?;

    app.group("/api", |api| {
        api.use_middleware(Middleware::new(cors).fingerprint(Fingerprint::CORS));
        api.get("/users/:id", get_user)?;
        api.route("/users", |users| {
            users.get(list_users).post(create_user);
            Ok(())
        })?;
        api.get("/files/*", get_file)?;
        Ok(())
    })?;

    info!(routes = tree.len(), "routes registered");

    let requests = [
        (Method::Get, "/api/users/42"),
        (Method::Post, "/api/users"),
        (Method::Options, "/api/users"),
        (Method::Get, "/api/files/docs/readme.md"),
        (Method::Get, "/healthz"),
        (Method::Delete, "/api/users/42"),
    ];

    for (method, path) in requests {
        let found = match tree.match_route(method, path) {
            Some(found) => found,
            None => match tree.match_not_found(path) {
                Some(found) => found,
                None => {
                    warn!(%method, path, "no route and no fallback");
                    continue;
                }
            },
        };

        let ctx = Context::new(method, path).with_params(found.params.clone());
        let status = match found.route.handler().call(ctx).await {
            Some(ctx) => ctx.status(),
            None => StatusCode::OK,
        };
        info!(
            %method,
            path,
            route = found.route.name(),
            kind = found.route.kind().as_str(),
            status = status.as_u16(),
            "dispatched"
        );
    }

    Ok(())
}

// GET /api/users/:id
async fn get_user(mut ctx: Context) -> Context {
    let id = ctx.param("id").unwrap_or("unknown").to_owned();
    ctx.json(format!(r#"{{"id":"{id}","name":"alice"}}"#));
    ctx
}

// GET /api/users
async fn list_users(mut ctx: Context) -> Context {
    ctx.json(r#"[{"id":"42","name":"alice"}]"#);
    ctx
}

// POST /api/users → 201 Created
async fn create_user(mut ctx: Context) -> Context {
    ctx.set_status(StatusCode::CREATED);
    ctx.json(r#"{"id":"99","name":"new_user"}"#);
    ctx
}

// GET /api/files/*
async fn get_file(mut ctx: Context) -> Context {
    let file = ctx.param("*").unwrap_or_default().to_owned();
    ctx.text(file);
    ctx
}

async fn not_found(mut ctx: Context) -> Context {
    ctx.set_status(StatusCode::NOT_FOUND);
    ctx
}

// Pass-through; a real CORS layer would set the access-control headers here.
async fn cors(ctx: Context) -> Context {
    ctx
}
