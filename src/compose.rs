//! Handler composition.

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;

/// Wraps `base` in each of `middlewares`, in the order given.
///
/// Every middleware wraps the result of the ones before it, so for
/// `[m1, m2, m3]` the returned handler is `m3(m2(m1(base)))`: the **last**
/// middleware listed is the outermost layer. It is the first to see an
/// incoming request and the last to see the outgoing response.
///
/// An empty list returns `base` unchanged. Composition never calls `base` or
/// the per-request logic of any middleware, only each middleware's
/// [`apply`](Middleware::apply).
///
/// Middleware of different types go through [`Middleware::boxed`]:
///
/// ```rust
/// use mw::{ContentType, Middleware, Request, Response, compose};
/// use mw::middleware::{header, status};
/// use http::StatusCode;
///
/// async fn data(_req: Request) -> Response {
///     Response::new(r#"{"data":"json"}"#)
/// }
///
/// // content_type is outermost: it runs last on the way out.
/// let handler = compose(data, [
///     status::set_status(StatusCode::CREATED).boxed(),
///     header::content_type(ContentType::Json).boxed(),
/// ]);
/// # let _ = handler;
/// ```
pub fn compose<H, I>(base: H, middlewares: I) -> BoxedHandler
where
    H: Handler,
    I: IntoIterator,
    I::Item: Middleware,
{
    middlewares
        .into_iter()
        .fold(base.into_boxed_handler(), |next, middleware| middleware.apply(next))
}
