//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A middleware must accept *any* handler and return another one, and
//! [`compose`](crate::compose) must be able to fold an arbitrary number of
//! them. Every layer of that fold therefore needs one concrete type. We use a
//! **trait object** (`dyn ErasedHandler`) behind an `Arc` to hide the
//! concrete handler type, and call the result a [`BoxedHandler`].
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn data(req: Request) -> Response { … }    ← user writes this
//!        ↓ compose(data, middlewares)
//! data.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(data))                        ← heap-allocated wrapper
//!        ↓  each middleware wraps the previous BoxedHandler
//! handler.call(req)  at request time               ← one vtable dispatch per layer
//!        ↓
//! Box::pin(async { data(req).await.into_response() })  ← BoxFuture
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let the server move the future across threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface behind [`BoxedHandler`].
pub(crate) trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

// ── BoxedHandler ──────────────────────────────────────────────────────────────

/// A type-erased handler shared across concurrent requests.
///
/// This is what [`compose`](crate::compose) returns and what every
/// [`Middleware`] receives as the handler it wraps. It is immutable once
/// built. Cloning costs one atomic increment.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn ErasedHandler + Send + Sync + 'static>);

impl BoxedHandler {
    /// Erases `handler`. A `BoxedHandler` passed in comes back as is.
    pub fn new(handler: impl Handler) -> Self {
        handler.into_boxed_handler()
    }

    /// Runs the handler against `req`.
    ///
    /// Middleware calls this on the handler it wraps; whatever it does
    /// before the call happens on the way in, whatever it does with the
    /// returned response happens on the way out.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedHandler").finish_non_exhaustive()
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is satisfied by [`BoxedHandler`]
/// and by any `async fn` or closure with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// impls in this module can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;

    /// Wraps `self` in `middleware`, which becomes the new outermost layer.
    ///
    /// `h.wrap(a).wrap(b)` behaves exactly like `compose(h, [a, b])`.
    fn wrap<M: Middleware>(self, middleware: M) -> BoxedHandler
    where
        Self: Sized,
    {
        middleware.apply(self.into_boxed_handler())
    }
}

mod private {
    pub trait Sealed {}
}

// ── Implementations ───────────────────────────────────────────────────────────

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
        BoxedHandler(Arc::new(FnHandler(self)))
    }
}

impl private::Sealed for BoxedHandler {}

/// Already erased; boxing again would only add a dispatch.
impl Handler for BoxedHandler {
    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;

    fn get(path: &str) -> Request {
        http::Request::get(path).body(Bytes::new()).unwrap().into()
    }

    #[tokio::test]
    async fn async_fn_becomes_a_boxed_handler() {
        async fn hello(req: Request) -> String {
            format!("hello {}", req.path())
        }

        let res = hello.into_boxed_handler().call(get("/world")).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"hello /world");
    }

    #[tokio::test]
    async fn closures_returning_a_status_are_handlers() {
        let handler = (|_req: Request| async { StatusCode::NO_CONTENT }).into_boxed_handler();

        let res = handler.call(get("/")).await;

        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn clones_share_the_same_handler() {
        let handler = (|_req: Request| async { "shared" }).into_boxed_handler();
        let clone = handler.clone();

        assert_eq!(handler.call(get("/")).await.body(), b"shared");
        assert_eq!(clone.call(get("/")).await.body(), b"shared");
    }

    #[test]
    fn boxing_a_boxed_handler_keeps_the_same_allocation() {
        let handler = (|_req: Request| async { "x" }).into_boxed_handler();
        let again = handler.clone().into_boxed_handler();

        assert!(Arc::ptr_eq(&handler.0, &again.0));
    }
}
