//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use safe_url_proxy::config::{FetchConfig, ProxyConfig};
use safe_url_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

/// Canned upstream response.
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    /// Send a Content-Length header matching `body`.
    pub declare_length: bool,
    /// Wait this long before answering.
    pub delay: Duration,
    /// Wait this long between the headers and the body.
    pub body_delay: Duration,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            declare_length: true,
            delay: Duration::ZERO,
            body_delay: Duration::ZERO,
        }
    }

    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::status(200)
            .header("Content-Type", content_type)
            .body(body)
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Close-delimited body with no Content-Length.
    pub fn undeclared_length(mut self) -> Self {
        self.declare_length = false;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Send the headers right away and hold the body back.
    pub fn stall_body(mut self, delay: Duration) -> Self {
        self.body_delay = delay;
        self
    }
}

/// A raw-TCP HTTP/1.1 upstream that records the methods it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    methods: Arc<Mutex<Vec<String>>>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.user_agents.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.methods.lock().unwrap().len()
    }
}

/// Start a programmable upstream; `f` maps the request method to a response.
pub async fn start_upstream<F>(f: F) -> MockUpstream
where
    F: Fn(&str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let methods = Arc::new(Mutex::new(Vec::new()));
    let user_agents = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = methods.clone();
    let agents = user_agents.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let f = f.clone();
            let recorded = recorded.clone();
            let agents = agents.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(&mut socket);
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
                    return;
                }
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => {
                            if let Some((name, value)) = line.split_once(':') {
                                if name.eq_ignore_ascii_case("user-agent") {
                                    agents.lock().unwrap().push(value.trim().to_string());
                                }
                            }
                        }
                    }
                }
                drop(reader);

                let method = request_line
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                recorded.lock().unwrap().push(method.clone());

                let response = f(&method);
                if !response.delay.is_zero() {
                    tokio::time::sleep(response.delay).await;
                }

                let mut head = format!("HTTP/1.1 {} Mock\r\nConnection: close\r\n", response.status);
                for (name, value) in &response.headers {
                    head.push_str(&format!("{name}: {value}\r\n"));
                }
                if response.declare_length {
                    head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
                }
                head.push_str("\r\n");

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.flush().await;
                if !response.body_delay.is_zero() {
                    tokio::time::sleep(response.body_delay).await;
                }
                if method != "HEAD" {
                    let _ = socket.write_all(&response.body).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream {
        addr,
        methods,
        user_agents,
    }
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running proxy; shut down on drop.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn endpoint(&self, target: &str, check_exists_only: Option<&str>) -> String {
        let base = format!("http://{}/api/GetSafeUrl", self.addr);
        let mut params = vec![("url", target)];
        if let Some(flag) = check_exists_only {
            params.push(("checkExistsOnly", flag));
        }
        Url::parse_with_params(&base, &params).unwrap().to_string()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        use_system_proxy: false,
        ..FetchConfig::default()
    }
}

pub async fn start_proxy(fetch: FetchConfig) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.fetch = fetch;
    config.observability.metrics_enabled = false;

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
