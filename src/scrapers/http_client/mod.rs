//! HTTP page fetcher with browser-like headers and request pacing.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::config::Settings;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Fetches pages over HTTP, one at a time, with a jittered delay between requests.
pub struct HttpFetcher {
    client: Client,
    request_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent.
    pub fn new(timeout: Duration, request_delay: Duration) -> Result<Self, FetchError> {
        Self::with_user_agent(timeout, request_delay, None)
    }

    /// Create a fetcher with custom user agent configuration.
    /// - None: default browser user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn with_user_agent(
        timeout: Duration,
        request_delay: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));

        let client = Client::builder()
            .user_agent(resolve_user_agent(user_agent_config))
            .default_headers(headers)
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            request_delay,
            last_request: Mutex::new(None),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Self::with_user_agent(
            Duration::from_secs(settings.request_timeout),
            Duration::from_millis(settings.request_delay_ms),
            settings.user_agent.as_deref(),
        )
    }

    /// Wait out the delay since the previous request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let wait = self.request_delay + jitter(self.request_delay);
            let elapsed = previous.elapsed();
            if elapsed < wait {
                tokio::time::sleep(wait - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Random extra delay in `[0, base)`.
fn jitter(base: Duration) -> Duration {
    let millis = base.as_millis() as usize;
    if millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis((user_agent::clock_entropy() % millis) as u64)
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        self.pace().await;
        debug!("GET {}", parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        Ok(FetchedPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
