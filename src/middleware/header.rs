//! Response header injection.
//!
//! ```rust
//! use mw::{ContentType, Handler, Request, Response};
//! use mw::middleware::header;
//!
//! async fn data(_req: Request) -> Response {
//!     Response::new(r#"{"data":"json"}"#)
//! }
//!
//! let handler = data.wrap(header::content_type(ContentType::Json));
//! # let _ = handler;
//! ```

use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::ContentType;

/// Gives every response of the wrapped handler a value for one header.
///
/// The value acts as a default: if the wrapped handler (or an inner layer)
/// already set the same header, its value wins and is left untouched.
#[derive(Clone, Debug)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

pub fn set_header(name: HeaderName, value: HeaderValue) -> SetHeader {
    SetHeader { name, value }
}

/// `content-type` shortcut for [`set_header`].
pub fn content_type(content_type: ContentType) -> SetHeader {
    set_header(CONTENT_TYPE, content_type.header_value())
}

impl Middleware for SetHeader {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        let layer = self.clone();
        (move |req: Request| {
            let next = next.clone();
            let SetHeader { name, value } = layer.clone();
            async move {
                let mut res = next.call(req).await;
                res.headers_mut().entry(name).or_insert(value);
                res
            }
        })
        .into_boxed_handler()
    }
}
