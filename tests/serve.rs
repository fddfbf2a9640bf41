//! End-to-end: a composed handler behind a real hyper HTTP/1.1 connection.

use bytes::Bytes;
use http::StatusCode;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use mw::middleware::{header, status, trace};
use mw::{BoxedHandler, ContentType, Middleware, Request, Response, compose};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn data(req: Request) -> Response {
    if req.path() == "/api/data" {
        Response::new(r#"{"data":"json"}"#)
    } else {
        Response::status(StatusCode::NOT_FOUND)
    }
}

fn app() -> BoxedHandler {
    compose(data, [
        status::set_status(StatusCode::CREATED).boxed(),
        header::content_type(ContentType::Json).boxed(),
        trace::trace().boxed(),
    ])
}

/// Serves one connection with `handler` and returns the bound address.
async fn serve_once(handler: BoxedHandler) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        http1::Builder::new()
            .serve_connection(TokioIo::new(stream), handler)
            .await
            .unwrap();
    });

    addr
}

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    String::from_utf8(raw).unwrap()
}

#[tokio::test]
async fn decorated_handler_answers_over_http() {
    let addr = serve_once(app()).await;

    let raw = raw_request(
        addr,
        "GET /api/data HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
    )
    .await;

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let mut lines = head.lines();
    assert_eq!(lines.next(), Some("HTTP/1.1 201 Created"));
    assert!(
        lines.any(|line| line.eq_ignore_ascii_case("content-type: application/json")),
        "missing content-type in:\n{head}",
    );
    assert_eq!(body, r#"{"data":"json"}"#);
}

#[tokio::test]
async fn request_body_reaches_the_handler() {
    let echo = compose(
        |req: Request| async move { Response::new(Bytes::copy_from_slice(req.body())) },
        [header::content_type(ContentType::Text)],
    );
    let addr = serve_once(echo).await;

    let raw = raw_request(
        addr,
        "POST /echo HTTP/1.1\r\nhost: localhost\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello",
    )
    .await;

    assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"), "unexpected response:\n{raw}");
    assert!(raw.ends_with("\r\n\r\nhello"));
}
