//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use hyper::body::Body;

use crate::error::{BoxError, Error};

/// An incoming HTTP request with its body fully buffered.
///
/// Middleware receives the request by value and hands it on to the handler
/// it wraps, so it may inspect or rewrite headers on the way in.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Request {
    /// Buffers the body of an `http::Request` and converts it.
    ///
    /// This is what the [`Service`](hyper::service::Service) impl on
    /// [`BoxedHandler`](crate::BoxedHandler) does for every request hyper
    /// hands it.
    pub async fn from_http<B>(req: http::Request<B>) -> Result<Self, Error>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let body = body.collect().await.map_err(Error::body)?.to_bytes();
        Ok(Self { method: parts.method, uri: parts.uri, headers: parts.headers, body })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// are reported as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Already-buffered requests convert without touching the body.
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self { method: parts.method, uri: parts.uri, headers: parts.headers, body }
    }
}
