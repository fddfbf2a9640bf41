//! A composed JSON endpoint behind a plain hyper server loop.
//!
//! mw does not accept connections; this demo shows the few lines a service
//! needs to drive a composed handler, including graceful shutdown.
//!
//! Run with:
//!   cargo run --example json_api
//!
//! Try:
//!   curl -i http://localhost:8080/api/data
//!   curl -i http://localhost:8080/nope

use std::net::SocketAddr;

use http::StatusCode;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use mw::middleware::{from_fn, header, trace};
use mw::{BoxedHandler, ContentType, Middleware, Request, Response, compose};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Last listed runs first: trace sees every request before the others.
    let app = compose(data, [
        from_fn(require_get).boxed(),
        header::content_type(ContentType::Json).boxed(),
        trace::trace().boxed(),
    ]);

    let addr: SocketAddr = "0.0.0.0:8080".parse().expect("invalid socket address");
    if let Err(e) = serve(addr, app).await {
        error!("server error: {e}");
    }
}

// GET /api/data
//
// The base handler does its own path check; mw has no router.
async fn data(req: Request) -> Response {
    match req.path() {
        "/api/data" => Response::new(r#"{"data":"json"}"#),
        _ => Response::status(StatusCode::NOT_FOUND),
    }
}

// Rejects anything but GET before the base handler runs.
async fn require_get(req: Request, next: BoxedHandler) -> Response {
    if req.method() != http::Method::GET {
        return Response::status(StatusCode::METHOD_NOT_ALLOWED);
    }
    next.call(req).await
}

async fn serve(addr: SocketAddr, app: BoxedHandler) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "json_api listening");

    let mut tasks = tokio::task::JoinSet::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let app = app.clone();
                tasks.spawn(async move {
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), app)
                        .await
                    {
                        error!(%peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}

    info!("json_api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
