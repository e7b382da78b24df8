//! HTTP/JSON processing service client
//!
//! Each operation is a `POST {base_url}/{operation}` with a JSON body;
//! the response body is the operation's result type.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{Artifact, Asset, BackendError, Content, Features, GenerationPrompt, ProcessingBackend};
use crate::preferences::ResolvedConfig;

/// Remote processing service client
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteBackend {
    /// Create client for the service at `base_url`
    ///
    /// `timeout` bounds each HTTP exchange at the transport level.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jcm-ai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, operation);
        debug!(url = %url, "Calling processing backend");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Rejected(format!(
                "{} returned HTTP {}",
                operation, status
            )));
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::TimedOut(self.timeout)
            } else {
                BackendError::Rejected(format!("{} returned invalid body: {}", operation, e))
            }
        })
    }

    /// Client deadline expiry is a timeout, anything else an outage
    fn transport_error(&self, operation: &str, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::TimedOut(self.timeout)
        } else {
            BackendError::Unavailable(format!("{}: {}", operation, err))
        }
    }
}

#[async_trait]
impl ProcessingBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn analyze(&self, asset: &Asset) -> Result<Features, BackendError> {
        self.call("analyze", &json!({ "asset": asset })).await
    }

    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        constraints: &ResolvedConfig,
    ) -> Result<Content, BackendError> {
        self.call(
            "generate",
            &json!({ "prompt": prompt, "constraints": constraints }),
        )
        .await
    }

    async fn mix(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        self.call("mix", &json!({ "asset": asset, "config": config }))
            .await
    }

    async fn master(&self, asset: &Asset, config: &ResolvedConfig) -> Result<Artifact, BackendError> {
        self.call("master", &json!({ "asset": asset, "config": config }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn sample_asset() -> Asset {
        Asset::Url {
            url: "https://example.com/a.mp3".to_string(),
        }
    }

    /// Read one full HTTP request (headers plus Content-Length body)
    async fn read_request(stream: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return;
                }
            }
        }
    }

    /// Serve a single canned HTTP response, returning the base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = RemoteBackend::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        // Reserve a free port, then release it so connections are refused
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend = RemoteBackend::new(
            format!("http://127.0.0.1:{}", port),
            Duration::from_millis(500),
        )
        .unwrap();
        let err = backend
            .analyze(&Asset::Url {
                url: "https://example.com/a.mp3".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_rejected() {
        let url = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;
        let backend = RemoteBackend::new(url, Duration::from_secs(5)).unwrap();

        let err = backend.analyze(&sample_asset()).await.unwrap_err();
        assert!(matches!(&err, BackendError::Rejected(msg) if msg.contains("500")), "{:?}", err);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let url = serve_once("200 OK", "{not json").await;
        let backend = RemoteBackend::new(url, Duration::from_secs(5)).unwrap();

        let err = backend.analyze(&sample_asset()).await.unwrap_err();
        assert!(
            matches!(&err, BackendError::Rejected(msg) if msg.contains("invalid body")),
            "{:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept, then never answer
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let timeout = Duration::from_millis(200);
        let backend = RemoteBackend::new(format!("http://{}", addr), timeout).unwrap();
        let err = backend.analyze(&sample_asset()).await.unwrap_err();
        assert_eq!(err, BackendError::TimedOut(timeout));
    }
}
