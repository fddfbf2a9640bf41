//! Middleware layer.
//!
//! A [`Middleware`] turns one handler into another. It is the right place
//! for cross-cutting concerns: structured tracing, header injection,
//! status rewriting, authentication-header inspection.
//!
//! `apply` only *builds* the wrapper. It must not call the handler it is
//! given; that happens per request, inside the returned handler.
//!
//! There are three ways to get one:
//!
//! - a closure `Fn(BoxedHandler) -> impl Handler`
//! - [`from_fn`] with an `async fn(Request, BoxedHandler) -> impl IntoResponse`
//! - the built-ins: [`header`], [`status`], [`trace`]
//!
//! Heterogeneous middleware lists are built with [`Middleware::boxed`] or
//! collected into a [`Stack`].

pub mod header;
pub mod status;
pub mod trace;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

// ── Middleware trait ──────────────────────────────────────────────────────────

/// Transforms a handler into another handler.
pub trait Middleware: Send + Sync + 'static {
    /// Wraps `next`, returning the handler that runs this layer's logic
    /// around it.
    fn apply(&self, next: BoxedHandler) -> BoxedHandler;

    /// Erases the concrete type so middleware of different types can share
    /// one list.
    fn boxed(self) -> BoxedMiddleware
    where
        Self: Sized,
    {
        BoxedMiddleware(Arc::new(self))
    }
}

impl<F, H> Middleware for F
where
    F: Fn(BoxedHandler) -> H + Send + Sync + 'static,
    H: Handler,
{
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        (self)(next).into_boxed_handler()
    }
}

// ── BoxedMiddleware ───────────────────────────────────────────────────────────

/// A type-erased, cloneable [`Middleware`].
#[derive(Clone)]
pub struct BoxedMiddleware(Arc<dyn Middleware>);

impl Middleware for BoxedMiddleware {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        self.0.apply(next)
    }

    fn boxed(self) -> BoxedMiddleware {
        self
    }
}

impl fmt::Debug for BoxedMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedMiddleware").finish_non_exhaustive()
    }
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Builds a middleware from an async function that receives the request and
/// the handler it wraps.
///
/// ```rust
/// use mw::{BoxedHandler, Request, Response};
/// use mw::middleware::from_fn;
///
/// async fn no_store(req: Request, next: BoxedHandler) -> Response {
///     let mut res = next.call(req).await;
///     res.headers_mut().insert(
///         http::header::CACHE_CONTROL,
///         http::HeaderValue::from_static("no-store"),
///     );
///     res
/// }
///
/// let middleware = from_fn(no_store);
/// # let _ = middleware;
/// ```
pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, BoxedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    FromFn { f: Arc::new(f) }
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F> {
    f: Arc<F>,
}

impl<F> Clone for FromFn<F> {
    fn clone(&self) -> Self {
        Self { f: Arc::clone(&self.f) }
    }
}

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, BoxedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        let f = Arc::clone(&self.f);
        (move |req: Request| (*f)(req, next.clone())).into_boxed_handler()
    }
}

// ── Stack ─────────────────────────────────────────────────────────────────────

/// A reusable, ordered list of middleware.
///
/// Layers are applied in insertion order, so the **last** layer added ends
/// up outermost: it sees the request first and the response last. This is
/// the same convention as [`compose`](crate::compose), and a `Stack` is
/// itself a [`Middleware`], so stacks nest.
///
/// ```rust
/// use mw::{ContentType, Request, Response, Stack};
/// use mw::middleware::{header, status};
/// use http::StatusCode;
///
/// async fn data(_req: Request) -> Response {
///     Response::new(r#"{"data":"json"}"#)
/// }
///
/// let api = Stack::new()
///     .layer(status::set_status(StatusCode::CREATED))
///     .layer(header::content_type(ContentType::Json));
///
/// let handler = api.wrap(data);
/// # let _ = handler;
/// ```
#[derive(Clone, Debug, Default)]
pub struct Stack {
    layers: Vec<BoxedMiddleware>,
}

impl Stack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Appends `middleware` as the new outermost layer.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(middleware.boxed());
        self
    }

    pub fn len(&self) -> usize { self.layers.len() }
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    /// Composes `base` with every layer of the stack.
    pub fn wrap(&self, base: impl Handler) -> BoxedHandler {
        self.apply(base.into_boxed_handler())
    }
}

impl Middleware for Stack {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        self.layers.iter().fold(next, |next, layer| layer.apply(next))
    }
}

impl FromIterator<BoxedMiddleware> for Stack {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(iter: I) -> Self {
        Self { layers: iter.into_iter().collect() }
    }
}

impl Extend<BoxedMiddleware> for Stack {
    fn extend<I: IntoIterator<Item = BoxedMiddleware>>(&mut self, iter: I) {
        self.layers.extend(iter);
    }
}
