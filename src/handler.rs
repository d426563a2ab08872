//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A route holds its handler *and* every middleware in front of it, each of a
//! different concrete type. Rust collections can only hold one concrete type,
//! so everything callable is hidden behind `dyn ErasedHandler` and stored
//! uniformly as a [`BoxedHandler`].
//!
//! ```text
//! async fn hello(ctx: Context) -> Context { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                      ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(ctx)  at request time              ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(ctx).await.into_outcome() })
//! ```
//!
//! Middleware and handlers share this shape: `(Context) -> Context | ()`,
//! delivered through a future. Returning `()` means "nothing to hand on".

use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

// ── Internal types ────────────────────────────────────────────────────────────

/// What a handler or middleware resolves to: the (possibly updated) context,
/// or nothing.
pub type Outcome = Option<Context>;

/// A heap-allocated, type-erased future resolving to an [`Outcome`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// Object-safe call interface behind every stored handler and middleware.
///
/// Public so runtime adapters can invoke a matched route's handler; it is
/// also named by `Handler::into_boxed_handler`.
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture;
}

/// A type-erased handler shared by every route and scope that references it.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler or middleware function.
///
/// You never implement this yourself. It is satisfied by any `async fn` (or
/// closure returning a future) with the signature:
///
/// ```text
/// async fn name(ctx: Context) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it, so a
/// registered handler is callable by construction.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Debug name of a handler type: the function's own name for `fn` items,
/// `None` for closures.
pub(crate) fn debug_name<H: ?Sized>() -> Option<String> {
    let full = type_name::<H>();
    if full.contains("{{closure}}") {
        return None;
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().map(str::to_owned)
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxFuture {
        let fut = (self.0)(ctx);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into an [`Outcome`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome { None }
}

impl IntoOutcome for Context {
    fn into_outcome(self) -> Outcome { Some(self) }
}

impl IntoOutcome for Option<Context> {
    fn into_outcome(self) -> Outcome { self }
}
