use crate::config::HttpSettings;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{NewsError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 10;
const ERROR_BODY_PREVIEW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpSettings::default())
    }
}

impl From<&HttpSettings> for RetryPolicy {
    fn from(settings: &HttpSettings) -> Self {
        Self {
            max_attempts: settings.retry_attempts.max(1),
            delay: settings.retry_delay(),
            timeout: settings.timeout(),
        }
    }
}

/// Shared client: redirects followed, no global timeout (set per request).
pub fn build_client(default_headers: HeaderMap) -> Result<Client> {
    let client = Client::builder()
        .default_headers(default_headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    Ok(client)
}

/// Send the request produced by `build`, retrying timeouts, transport failures,
/// HTTP 429 and 5xx responses. Other non-success statuses fail at once.
pub async fn send_with_retry<F>(policy: &RetryPolicy, target: &str, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let last_attempt = attempt >= max_attempts;

        match build().timeout(policy.timeout).send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
                tracing::error!("HTTP error: {} - {}", status, preview);

                let err = NewsError::StatusError { status, body: preview };
                if last_attempt || !err.is_retryable() {
                    return Err(err);
                }
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "Request to {} timed out (attempt {}/{})",
                    target,
                    attempt,
                    max_attempts
                );
                if last_attempt {
                    return Err(NewsError::TimeoutError { attempts: attempt });
                }
            }
            Err(e) => {
                tracing::error!("Request to {} failed: {}", target, e);
                let err = NewsError::from(e);
                if last_attempt || !err.is_retryable() {
                    return Err(err);
                }
            }
        }

        tokio::time::sleep(policy.delay).await;
    }
}

/// Downloads article pages with browser-like headers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        Ok(Self {
            client: build_client(headers)?,
            policy,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching article page: {}", url);
        let response = send_with_retry(&self.policy, url, || self.client.get(url)).await?;
        Ok(response.text().await?)
    }
}
