//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use fanout_proxy::{BackendRegistry, HttpServer, ProxyConfig, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Scripted reply of a programmable backend.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Read one HTTP/1.1 request (head plus content-length body) off the socket.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let mut have = buf.len() - (end + 4);
            while have < content_length {
                let n = socket.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                have += n;
            }
            return Ok(());
        }
    }
}

/// Start a backend that answers every request with `f()`, one request per connection.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_err() {
                    return;
                }
                let reply = f().await;
                tokio::time::sleep(reply.delay).await;

                let response = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.body.len(),
                    reply.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a backend that always returns the same reply.
pub async fn start_mock_backend(reply: Reply) -> SocketAddr {
    start_programmable_backend(move || {
        let reply = reply.clone();
        async move { reply }
    })
    .await
}

/// Start a backend that sends a response head and a fragment of a much longer
/// body, then holds the connection open. The returned flag flips once the
/// proxy closes the connection.
pub async fn start_stalling_backend(status: u16, delay: Duration) -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let flag = flag.clone();
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_err() {
                    return;
                }

                // A peer that hangs up before the head is sent counts as closed too.
                let mut probe = [0u8; 1];
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = socket.read(&mut probe) => {
                        flag.store(true, Ordering::SeqCst);
                        return;
                    }
                }

                let head = format!(
                    "HTTP/1.1 {} Stalling\r\nContent-Length: 1048576\r\n\r\npartial-body",
                    status
                );
                if socket.write_all(head.as_bytes()).await.is_err() {
                    flag.store(true, Ordering::SeqCst);
                    return;
                }

                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }
                flag.store(true, Ordering::SeqCst);
            });
        }
    });

    (addr, closed)
}

/// Serve an axum app as a backend.
pub async fn start_axum_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

/// A running proxy instance.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub registry: Arc<BackendRegistry>,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(backends: &[String], configure: impl FnOnce(&mut ProxyConfig)) -> TestProxy {
    let mut config = ProxyConfig::default();
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let registry = Arc::new(BackendRegistry::from_list(&backends.join(",")).unwrap());
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, Arc::clone(&registry));
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        registry,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Poll `flag` until it is set or `within` elapses.
pub async fn wait_for(flag: &AtomicBool, within: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if flag.load(Ordering::SeqCst) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    flag.load(Ordering::SeqCst)
}
