//! Bridge from [`BoxedHandler`] to hyper's `Service` trait.
//!
//! A composed handler plugs straight into any hyper connection:
//!
//! ```rust,ignore
//! hyper::server::conn::http1::Builder::new()
//!     .serve_connection(TokioIo::new(stream), handler.clone())
//!     .await?;
//! ```
//!
//! Accepting connections is the caller's business.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::service::Service;

use crate::error::{BoxError, Error};
use crate::handler::BoxedHandler;
use crate::request::Request;

type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<Full<Bytes>>, Error>> + Send + 'static>>;

impl<B> Service<http::Request<B>> for BoxedHandler
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Error;
    type Future = ServiceFuture;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move {
            let req = Request::from_http(req).await?;
            Ok(BoxedHandler::call(&handler, req).await.into_http())
        })
    }
}
