//! Shared utilities for relay integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use cors_relay::config::RelayConfig;
use cors_relay::{RelayServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A request as seen by the mock target.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Captured {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Records every request the mock target receives.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    requests: Arc<Mutex<Vec<Captured>>>,
}

#[allow(dead_code)]
impl Capture {
    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last(&self) -> Captured {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("target received no request")
    }

    async fn record(&self, request: Request) -> Captured {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let captured = Captured {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        };
        self.requests.lock().unwrap().push(captured.clone());
        captured
    }
}

/// Echo the body back with the same content type.
async fn echo(State(capture): State<Capture>, request: Request) -> Response {
    let captured = capture.record(request).await;
    let mut response = Response::new(Body::from(captured.body));
    if let Some(ct) = captured.headers.get(header::CONTENT_TYPE) {
        response.headers_mut().insert(header::CONTENT_TYPE, ct.clone());
    }
    response
}

async fn status(State(capture): State<Capture>, Path(code): Path<u16>, request: Request) -> Response {
    capture.record(request).await;
    let status = StatusCode::from_u16(code).unwrap();
    (status, format!("status {}", code)).into_response()
}

async fn redirect(State(capture): State<Capture>, request: Request) -> Response {
    capture.record(request).await;
    (StatusCode::FOUND, [(header::LOCATION, "/final")]).into_response()
}

async fn final_hop(State(capture): State<Capture>, request: Request) -> Response {
    capture.record(request).await;
    (StatusCode::OK, "final destination").into_response()
}

async fn decorated(State(capture): State<Capture>, request: Request) -> Response {
    capture.record(request).await;
    let mut response = Response::new(Body::from("decorated"));
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://only.example".parse().unwrap());
    headers.insert(header::CACHE_CONTROL, "public, max-age=600".parse().unwrap());
    headers.insert("x-upstream", "yes".parse().unwrap());
    headers.append(header::SET_COOKIE, "a=1".parse().unwrap());
    headers.append(header::SET_COOKIE, "b=2".parse().unwrap());
    response
}

/// Server-sent events, one every 50ms.
async fn events(State(capture): State<Capture>, request: Request) -> Response {
    capture.record(request).await;
    let stream = futures_util::stream::unfold(0u32, |n| async move {
        if n == 3 {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        Some((Ok::<_, std::io::Error>(format!("data: {}\n\n", n)), n + 1))
    });
    let mut response = Response::new(Body::from_stream(stream));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, "text/event-stream".parse().unwrap());
    response
}

/// Start a mock target on an ephemeral port.
pub async fn start_target() -> (SocketAddr, Capture) {
    let capture = Capture::default();
    let app = Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", any(status))
        .route("/redirect", any(redirect))
        .route("/final", any(final_hop))
        .route("/decorated", get(decorated))
        .route("/events", get(events))
        .with_state(capture.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, capture)
}

/// Start a target that answers every connection with the raw bytes of `response`.
#[allow(dead_code)]
pub async fn start_raw_target(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_head(&mut socket).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Consume a request head; the raw target only serves body-less requests.
async fn read_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    head
}

/// Send a GET for `path_and_query` over a plain socket and return the raw response.
#[allow(dead_code)]
pub async fn raw_get(relay: SocketAddr, path_and_query: &str) -> String {
    let mut socket = TcpStream::connect(relay).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path_and_query, relay
    );
    socket.write_all(request.as_bytes()).await.unwrap();
    let mut raw = Vec::new();
    socket.read_to_end(&mut raw).await.unwrap();
    String::from_utf8_lossy(&raw).into_owned()
}

/// Start the relay with `config` on an ephemeral port.
pub async fn start_relay(mut config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Relay endpoint URL for `target`, percent-encoded the way a browser would.
pub fn relay_url(relay: SocketAddr, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("http://{}/api/proxy?url={}", relay, encoded)
}

/// Client that does not follow redirects itself, so only the relay can.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
