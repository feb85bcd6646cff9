//! Testing utilities including mock implementations.
//!
//! These let applications exercise the outreach pipeline without real
//! network access or generation-service calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::{FetchError, GenerationError};
use crate::extractor::ContextSource;
use crate::generation::Generator;
use crate::types::context::{ContextSummary, SiteContext};

/// Record of a call made to the mock generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockGeneratorCall {
    ColdEmail { prompt: String },
    FollowUp { prompt: String },
}

/// A mock generator returning fixed replies.
///
/// A `None` reply makes that operation fail with [`GenerationError::Empty`].
#[derive(Debug, Default)]
pub struct MockGenerator {
    cold_reply: Option<String>,
    follow_up_reply: Option<String>,
    calls: Arc<Mutex<Vec<MockGeneratorCall>>>,
}

impl MockGenerator {
    /// Both operations answer with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            cold_reply: Some(reply.clone()),
            follow_up_reply: Some(reply),
            ..Default::default()
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_follow_up(mut self, reply: impl Into<String>) -> Self {
        self.follow_up_reply = Some(reply.into());
        self
    }

    pub fn without_follow_up(mut self) -> Self {
        self.follow_up_reply = None;
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, call: MockGeneratorCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn cold_email(&self, prompt: &str) -> Result<String, GenerationError> {
        self.record(MockGeneratorCall::ColdEmail {
            prompt: prompt.to_string(),
        });
        self.cold_reply.clone().ok_or(GenerationError::Empty)
    }

    async fn follow_up(&self, prompt: &str) -> Result<String, GenerationError> {
        self.record(MockGeneratorCall::FollowUp {
            prompt: prompt.to_string(),
        });
        self.follow_up_reply.clone().ok_or(GenerationError::Empty)
    }
}

/// Context source with canned summaries per URL.
///
/// URLs without a canned summary behave like an unresponsive site.
#[derive(Debug, Default)]
pub struct StaticContextSource {
    summaries: HashMap<String, ContextSummary>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl StaticContextSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, url: impl Into<String>, summary: ContextSummary) -> Self {
        self.summaries.insert(url.into(), summary);
        self
    }

    /// URLs requested so far, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ContextSource for StaticContextSource {
    async fn extract(&self, url: &str) -> SiteContext {
        self.requested
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        match self.summaries.get(url) {
            Some(summary) => SiteContext::Available(summary.clone()),
            None => SiteContext::Unavailable(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Throwaway HTTP server on `127.0.0.1` for exercising real fetches.
///
/// The server stops when the value is dropped.
pub struct StubSite {
    url: String,
    task: tokio::task::JoinHandle<()>,
}

impl StubSite {
    /// Answer every request with the same status, content type and body.
    pub async fn serve(
        status: u16,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);

        let body = body.into();
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Stub");
        let mut response = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(&body);

        Ok(Self {
            url,
            task: respond_forever(listener, response),
        })
    }

    /// Answer every request with a `302` pointing back at the same URL.
    pub async fn redirect_to_self() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/", listener.local_addr()?);

        let response = format!(
            "HTTP/1.1 302 Found\r\nLocation: {url}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
        .into_bytes();

        Ok(Self {
            task: respond_forever(listener, response),
            url,
        })
    }

    /// Accept connections but never answer, to provoke client timeouts.
    pub async fn silent() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);

        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        Ok(Self { url, task })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for StubSite {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn respond_forever(listener: TcpListener, response: Vec<u8>) -> tokio::task::JoinHandle<()> {
    let response = Arc::new(response);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = Arc::clone(&response);
            tokio::spawn(async move {
                if read_request(&mut socket).await.is_ok() {
                    let _ = socket.write_all(&response).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    })
}

/// Read one request: headers plus a `Content-Length` body if present.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_records_calls() {
        let generator = MockGenerator::new("Hello").without_follow_up();

        assert_eq!(generator.cold_email("p1").await.unwrap(), "Hello");
        assert!(generator.follow_up("p2").await.is_err());
        assert_eq!(
            generator.calls(),
            vec![
                MockGeneratorCall::ColdEmail { prompt: "p1".into() },
                MockGeneratorCall::FollowUp { prompt: "p2".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_static_context_source() {
        let summary = ContextSummary::new(Some("Acme".into()), None, None);
        let source = StaticContextSource::new().with_summary("https://acme.example", summary);

        assert!(source.extract("https://acme.example").await.is_available());
        assert!(!source.extract("https://other.example").await.is_available());
        assert_eq!(
            source.requested(),
            vec!["https://acme.example", "https://other.example"]
        );
    }
}
