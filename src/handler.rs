//! Handler trait and type erasure.
//!
//! The router holds handlers of different concrete types in one
//! `HashMap<Method, Tree>`, so each handler is erased behind
//! `dyn ErasedHandler` when it is registered:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← stored as BoxedHandler
//!        ↓
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture<'static>
//! ```
//!
//! Handlers sit at the end of a [`Pipeline`](crate::middleware::Pipeline).
//! The [`Router`](crate::Router) is the middleware that looks one up and
//! returns its `'static` future in place of the pipeline's borrowed one.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Pin<Box<…>>` lets the runtime poll the future in place after it has been
/// returned through a trait object.
///
/// The lifetime is split by who produces the future:
///
/// - handlers own everything they touch (the `Request` is moved in), so
///   [`ErasedHandler::call`] returns `BoxFuture<'static>`;
/// - middleware borrows itself and the rest of the chain through
///   [`Next<'a>`](crate::middleware::Next), so it returns `BoxFuture<'a>`.
///
/// A `'static` future coerces to any `'a`, which is how the router hands a
/// handler's future back up the pipeline unchanged.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of
/// [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static>;
}

/// Shared across every request the route answers; cloning it per request is
/// one atomic increment.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed; only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// `Sealed` is private, so other crates cannot name it or implement
/// `Handler` themselves.
mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` to the [`ErasedHandler`] trait object.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static> {
        // `fut` owns `req`, so the boxed future borrows nothing from `self`.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
