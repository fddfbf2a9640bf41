//! Response status rewriting.

use http::StatusCode;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Overrides the status of every response of the wrapped handler.
#[derive(Clone, Copy, Debug)]
pub struct SetStatus {
    status: StatusCode,
}

/// `set_status(StatusCode::CREATED)` turns every response of the wrapped
/// handler into a `201 Created`, whatever status the handler chose.
pub fn set_status(status: StatusCode) -> SetStatus {
    SetStatus { status }
}

impl Middleware for SetStatus {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        let status = self.status;
        (move |req: Request| {
            let next = next.clone();
            async move {
                let mut res = next.call(req).await;
                res.set_status(status);
                res
            }
        })
        .into_boxed_handler()
    }
}
