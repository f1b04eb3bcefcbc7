//! HTTP access to the video platforms.
//!
//! All outbound traffic goes through the [`Fetcher`] trait so extractors and
//! the orchestrator never touch `reqwest` directly. [`HttpClient`] is the real
//! implementation; tests substitute a canned one.

use crate::config::ScoutConfig;
use crate::error::{Result, ScrapeError};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Raw response from a platform: status code and decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET request.
///
/// Implementations do not retry; a failed request is reported once and the
/// caller decides what an empty source means.
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// [`Fetcher`] backed by one shared `reqwest::Client`, so connections are
/// reused across platforms.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_secs: u64,
}

impl HttpClient {
    /// Build a client with the configured User-Agent and timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the User-Agent is not a valid header value or the
    /// TLS backend cannot be initialized.
    pub fn new(config: &ScoutConfig) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .user_agent(HeaderValue::from_str(&config.user_agent)?)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            client,
            timeout_secs: config.request_timeout_secs,
        })
    }
}

impl Fetcher for HttpClient {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| self.classify(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(FetchResponse { status, body })
    }
}

impl HttpClient {
    fn classify(&self, url: &str, e: reqwest::Error) -> ScrapeError {
        warn!(%url, error = %e, "Request failed");
        if e.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
                secs: self.timeout_secs,
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// What a [`StubFetcher`] answers for a host.
    pub enum Canned {
        Page(u16, String),
        Unreachable,
    }

    /// Offline [`Fetcher`] answering by URL host and counting calls.
    #[derive(Default)]
    pub struct StubFetcher {
        routes: HashMap<String, Canned>,
        calls: AtomicUsize,
        requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, host: &str, status: u16, body: &str) -> Self {
            self.routes.insert(host.to_string(), Canned::Page(status, body.to_string()));
            self
        }

        pub fn unreachable(mut self, host: &str) -> Self {
            self.routes.insert(host.to_string(), Canned::Unreachable);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(url.to_string());

            let host = url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            match self.routes.get(&host) {
                Some(Canned::Page(status, body)) => Ok(FetchResponse {
                    status: *status,
                    body: body.clone(),
                }),
                Some(Canned::Unreachable) => Err(ScrapeError::Timeout {
                    url: url.to_string(),
                    secs: 15,
                }),
                None => Ok(FetchResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = |status| FetchResponse { status, body: String::new() };
        assert!(ok(200).is_success());
        assert!(ok(204).is_success());
        assert!(!ok(301).is_success());
        assert!(!ok(503).is_success());
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(HttpClient::new(&ScoutConfig::default()).is_ok());
    }

    #[test]
    fn test_client_rejects_bad_user_agent() {
        let config = ScoutConfig {
            user_agent: "bad\nagent".to_string(),
            ..ScoutConfig::default()
        };
        assert!(HttpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                .await
                .unwrap();
            String::from_utf8_lossy(&head).to_lowercase()
        });

        let client = HttpClient::new(&ScoutConfig::default()).unwrap();
        let response = client.fetch(&format!("http://{addr}/search?q=cats")).await.unwrap();
        assert_eq!(response, FetchResponse { status: 200, body: "ok".to_string() });

        let head = server.await.unwrap();
        assert!(head.starts_with("get /search?q=cats http/1.1"));
        let user_agent = format!("user-agent: {}", crate::config::DEFAULT_USER_AGENT.to_lowercase());
        assert!(head.contains(&user_agent), "{head}");
        assert!(head.contains("accept-language: en-us,en;q=0.9"), "{head}");
        assert!(head.contains("accept: text/html"), "{head}");
    }
}
