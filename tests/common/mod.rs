//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use tsl_stats::api::StatsClient;
use tsl_stats::cache::ResponseCache;
use tsl_stats::{Fetcher, HttpTransport, RateLimiter, RetryPolicy};

/// A success envelope wrapping `data`.
#[allow(dead_code)]
pub fn success_body(cached_until: i64, data: &str) -> String {
    format!(r#"{{"success":true,"cache":{{"status":"miss","cached_at":0,"cached_until":{cached_until}}},"data":{data}}}"#)
}

/// Start a mock backend that always returns `body` with status 200.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, body.to_string()) }).await
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request target (path and query) and returns status and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(target) = read_request_target(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(target).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request_target(socket: &mut TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let head = String::from_utf8_lossy(&head);
    head.lines().next()?.split_whitespace().nth(1).map(str::to_string)
}

/// A client pointed at `addr` with no rate limit and `max_attempts` attempts per request.
#[allow(dead_code)]
pub fn client_for(addr: SocketAddr, max_attempts: u32) -> StatsClient {
    let transport = HttpTransport::with_client(
        reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap(),
    );
    StatsClient::new(
        Fetcher::new(
            transport,
            RateLimiter::new(Duration::ZERO),
            RetryPolicy::new(max_attempts),
            ResponseCache::new(),
        ),
        Url::parse(&format!("http://{addr}/api/")).unwrap(),
        Url::parse(&format!("http://{addr}/user-content/")).unwrap(),
    )
}
