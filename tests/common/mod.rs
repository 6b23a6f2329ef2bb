//! Shared utilities for integration tests.
//!
//! Mock endpoints speak just enough HTTP/1.1 for a probe: read the request
//! head, write one response, close.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use exchange_ping::emitter::{MemoryBackend, MemorySink};
use exchange_ping::probe::{ProbeSettings, TargetDescriptor};
use exchange_ping::Handler;

/// Requests seen by a mock endpoint, head and body as text.
pub type Captured = Arc<Mutex<Vec<String>>>;

/// Start a mock endpoint that answers every request with `status` and `body`.
pub async fn start_mock_endpoint(status: u16, body: &'static str) -> SocketAddr {
    start_programmable_endpoint(move || async move { (status, body.to_string()) }).await.0
}

/// Start a mock endpoint whose response is produced by `f` per request.
/// Returns the bound address and the captured raw requests.
pub async fn start_programmable_endpoint<F, Fut>(f: F) -> (SocketAddr, Captured)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let seen = captured.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        seen.lock().unwrap().push(request);

                        let (status, body) = f().await;
                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason_phrase(status),
                            content_type(&body),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

/// Start an endpoint that accepts connections and never answers.
pub async fn start_silent_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// An address with nothing listening on it.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Descriptor pointing at a local mock.
pub fn local_target(name: &str, addr: SocketAddr, path: &str) -> TargetDescriptor {
    TargetDescriptor::new(name, format!("http://{}{}", addr, path), "devo").unwrap()
}

/// Handler wired to in-memory backend and sink, proxies disabled.
pub fn memory_handler(backend: &MemoryBackend, sink: &MemorySink, timeout: Duration) -> Handler {
    Handler::new(Arc::new(backend.clone()), Arc::new(sink.clone())).with_probe_settings(ProbeSettings {
        timeout,
        use_system_proxy: false,
    })
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(head_end) = find_head_end(&buf) {
                    let body_len = content_length(&buf[..head_end]);
                    if buf.len() >= head_end + body_len {
                        break;
                    }
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn content_type(body: &str) -> &'static str {
    if body.starts_with('{') || body.starts_with('[') {
        "application/json"
    } else {
        "text/plain"
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
