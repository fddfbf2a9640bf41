//! # mw
//!
//! Deterministic middleware composition for async HTTP handlers.
//! One function does the work: [`compose`].
//!
//! ## The contract
//!
//! A **handler** turns a [`Request`] into a [`Response`]. A **middleware**
//! turns a handler into another handler. [`compose`] folds a list of
//! middleware over a base handler:
//!
//! ```text
//! compose(h, [m1, m2, m3])  ==  m3(m2(m1(h)))
//!
//!   request ──▶ m3 ──▶ m2 ──▶ m1 ──▶ h
//!  response ◀── m3 ◀── m2 ◀── m1 ◀──┘
//! ```
//!
//! The **last** middleware listed is the outermost layer. Frameworks that
//! make the first-listed middleware outermost reverse this; mw does not.
//!
//! Composition is pure: it never calls the handler or the per-request logic
//! of a middleware, and it cannot fail. What happens when the composed
//! handler runs (including panics inside a layer) is up to the server
//! driving it.
//!
//! What mw intentionally ignores:
//!
//! - **Routing** — dispatch on path/method before or inside the base handler
//! - **Connections** — any hyper server loop can drive a [`BoxedHandler`]
//!   through its `hyper::service::Service` impl
//! - **Retries, backpressure, timeouts** — write them as middleware
//!
//! ## Quick start
//!
//! ```rust
//! use mw::{ContentType, Middleware, Request, Response, compose};
//! use mw::middleware::{header, status, trace};
//! use http::StatusCode;
//!
//! async fn data(_req: Request) -> Response {
//!     Response::new(r#"{"data":"json"}"#)
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let handler = compose(data, [
//!     status::set_status(StatusCode::CREATED).boxed(),
//!     header::content_type(ContentType::Json).boxed(),
//!     trace::trace().boxed(),
//! ]);
//!
//! let req = http::Request::get("/api/data").body(bytes::Bytes::new()).unwrap();
//! let res = handler.call(req.into()).await;
//!
//! assert_eq!(res.status_code(), StatusCode::CREATED);
//! assert_eq!(res.header("content-type"), Some("application/json"));
//! assert_eq!(res.body(), br#"{"data":"json"}"#);
//! # }
//! ```

mod compose;
mod error;
mod handler;
mod request;
mod response;
mod service;

pub mod middleware;

pub use compose::compose;
pub use error::{BoxError, Error};
pub use handler::{BoxFuture, BoxedHandler, Handler};
pub use middleware::{BoxedMiddleware, Middleware, Stack};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
