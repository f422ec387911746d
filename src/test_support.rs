//! In-test stand-ins for the LLM endpoint and for remote HTTP servers.

use crate::api::AskAsync;
use crate::config::{AppConfig, HttpConfig};
use crate::http::HttpFetcher;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// An [`AskAsync`] that returns a fixed reply (or always fails) and records every call.
#[derive(Debug, Default)]
pub struct ScriptedAsk {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedAsk {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl AskAsync for ScriptedAsk {
    async fn ask(&self, _system: &str, user: &str) -> Result<String, Box<dyn Error>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err("scripted failure".into()),
        }
    }
}

/// What the stub server does with one incoming connection.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write this raw HTTP response and close.
    Raw(String),
    /// Hold the connection open without answering, then close.
    Stall(Duration),
}

impl Reply {
    pub fn status(status: &str, body: &str) -> Self {
        Reply::Raw(format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        ))
    }

    pub fn ok(body: &str) -> Self {
        Self::status("200 OK", body)
    }

    /// A 200 that promises `claimed` bytes but sends only `body`.
    pub fn truncated(body: &str, claimed: usize) -> Self {
        Reply::Raw(format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {claimed}\r\n\
             Connection: close\r\n\r\n{body}"
        ))
    }
}

/// A loopback server answering successive connections with `replies`, in order.
/// Once the replies run out the listener is dropped and connections are refused.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            for reply in replies {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                match reply {
                    Reply::Raw(raw) => {
                        let _ = socket.write_all(raw.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Reply::Stall(duration) => tokio::time::sleep(duration).await,
                }
            }
        });

        Self { base_url, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Connections accepted so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// A URL on a loopback port nobody listens on.
pub async fn unreachable_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}{path}")
}

/// Defaults with millisecond backoff so retry tests stay fast.
pub fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.http = fast_http();
    config
}

pub fn fast_http() -> HttpConfig {
    HttpConfig {
        timeout_secs: 2,
        base_delay_ms: 1,
        ..HttpConfig::default()
    }
}

pub fn fast_fetcher() -> HttpFetcher {
    HttpFetcher::new(&fast_http()).unwrap()
}
