//! Per-request tracing.
//!
//! Opens a `request` span carrying the method and path, runs the wrapped
//! handler inside it, and emits one completion event with the status and the
//! latency. Install a `tracing` subscriber to see the output; without one
//! the layer costs a few atomic loads per request.
//!
//! Put it last in the middleware list so it is the outermost layer and the
//! latency covers every other layer:
//!
//! ```rust
//! use mw::{ContentType, Request, Response, compose};
//! use mw::middleware::{Middleware, header, trace};
//!
//! async fn data(_req: Request) -> Response {
//!     Response::new(r#"{"data":"json"}"#)
//! }
//!
//! let handler = compose(data, [
//!     header::content_type(ContentType::Json).boxed(),
//!     trace::trace().boxed(),
//! ]);
//! # let _ = handler;
//! ```

use std::time::Instant;

use http::StatusCode;
use tracing::{Instrument, Level, Span};

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;

/// Middleware returned by [`trace()`].
#[derive(Clone, Copy, Debug)]
pub struct Trace {
    level: Level,
}

/// Traces every request at `INFO`.
pub fn trace() -> Trace {
    Trace { level: Level::INFO }
}

impl Trace {
    /// Level of the `request` span and of the completion event. Server
    /// errors are always reported at `ERROR` regardless.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

impl Middleware for Trace {
    fn apply(&self, next: BoxedHandler) -> BoxedHandler {
        let level = self.level;
        (move |req: Request| {
            let next = next.clone();
            let span = request_span(level, &req);
            async move {
                let started = Instant::now();
                let res = next.call(req).await;
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                completed(level, res.status_code(), latency_ms);
                res
            }
            .instrument(span)
        })
        .into_boxed_handler()
    }
}

// Callsite levels must be constants, hence one macro per level.
fn request_span(level: Level, req: &Request) -> Span {
    let (method, path) = (req.method(), req.path());
    if level == Level::TRACE {
        tracing::trace_span!("request", %method, path)
    } else if level == Level::DEBUG {
        tracing::debug_span!("request", %method, path)
    } else if level == Level::INFO {
        tracing::info_span!("request", %method, path)
    } else if level == Level::WARN {
        tracing::warn_span!("request", %method, path)
    } else {
        tracing::error_span!("request", %method, path)
    }
}

fn completed(level: Level, status: StatusCode, latency_ms: f64) {
    let status = status.as_u16();
    if status >= 500 {
        tracing::error!(status, latency_ms, "request failed");
    } else if level == Level::TRACE {
        tracing::trace!(status, latency_ms, "request completed");
    } else if level == Level::DEBUG {
        tracing::debug!(status, latency_ms, "request completed");
    } else if level == Level::INFO {
        tracing::info!(status, latency_ms, "request completed");
    } else if level == Level::WARN {
        tracing::warn!(status, latency_ms, "request completed");
    } else {
        tracing::error!(status, latency_ms, "request completed");
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use super::*;
    use crate::response::Response;

    fn get(path: &str) -> Request {
        http::Request::get(path).body(Bytes::new()).unwrap().into()
    }

    /// Field name/value pairs, values rendered with `Debug`.
    #[derive(Default)]
    struct Fields(Vec<(String, String)>);

    impl Fields {
        fn get(&self, name: &str) -> Option<&str> {
            self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
        }
    }

    impl Visit for Fields {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_owned(), format!("{value:?}")));
        }
    }

    struct Recorded {
        level: Level,
        fields: Fields,
    }

    /// Layer that keeps every span and event it sees.
    #[derive(Clone, Default)]
    struct Capture {
        spans: Arc<Mutex<Vec<Recorded>>>,
        events: Arc<Mutex<Vec<Recorded>>>,
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            attrs.record(&mut fields);
            let level = *attrs.metadata().level();
            self.spans.lock().unwrap().push(Recorded { level, fields });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = Fields::default();
            event.record(&mut fields);
            let level = *event.metadata().level();
            self.events.lock().unwrap().push(Recorded { level, fields });
        }
    }

    async fn run_traced(layer: Trace, status: StatusCode, path: &str) -> Capture {
        let capture = Capture::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

        let handler = (move |_req: Request| async move { status }).wrap(layer);
        let res = handler.call(get(path)).await;
        assert_eq!(res.status_code(), status);

        capture
    }

    #[tokio::test]
    async fn passes_the_response_through_untouched() {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt().with_test_writer().with_max_level(Level::TRACE).finish(),
        );
        let handler = (|_req: Request| async {
            Response::builder().status(StatusCode::ACCEPTED).text("queued")
        })
        .wrap(trace().level(Level::DEBUG));

        let res = handler.call(get("/jobs")).await;

        assert_eq!(res.status_code(), StatusCode::ACCEPTED);
        assert_eq!(res.body(), b"queued");
    }

    #[tokio::test]
    async fn span_carries_method_and_path_at_the_configured_level() {
        let capture = run_traced(trace().level(Level::DEBUG), StatusCode::OK, "/jobs/7").await;

        let spans = capture.spans.lock().unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].level, Level::DEBUG);
        assert_eq!(spans[0].fields.get("method"), Some("GET"));
        assert_eq!(spans[0].fields.get("path"), Some("\"/jobs/7\""));
    }

    #[tokio::test]
    async fn completion_event_uses_the_configured_level() {
        let capture = run_traced(trace().level(Level::WARN), StatusCode::OK, "/").await;

        let events = capture.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].fields.get("message"), Some("request completed"));
        assert_eq!(events[0].fields.get("status"), Some("200"));
        assert!(events[0].fields.get("latency_ms").is_some());
    }

    #[tokio::test]
    async fn server_errors_are_always_reported_at_error() {
        let capture = run_traced(trace().level(Level::DEBUG), StatusCode::BAD_GATEWAY, "/up").await;

        let events = capture.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].fields.get("message"), Some("request failed"));
        assert_eq!(events[0].fields.get("status"), Some("502"));
    }

    #[tokio::test]
    async fn client_errors_keep_the_configured_level() {
        let capture = run_traced(trace(), StatusCode::NOT_FOUND, "/missing").await;

        let events = capture.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].fields.get("status"), Some("404"));
    }
}
