// src/sources/fetch.rs
//! Transport used by the adapters. Adapters only see [`PageFetcher`]; the
//! timeout and retry policy live in [`HttpFetcher`].

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use std::{collections::HashMap, time::Duration};

use crate::config::HttpConfig;
use crate::error::{ConfigError, SourceError};

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body as text.
    async fn get_text(&self, url: &str) -> Result<String, SourceError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    max_retries: u8,
}

impl HttpFetcher {
    pub fn new(cfg: &HttpConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_retries: cfg.max_retries.max(1),
        })
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .and_then(|rsp| rsp.error_for_status());

            let err = match res {
                Ok(rsp) => match rsp.text().await {
                    Ok(body) => return Ok(body),
                    Err(e) => e,
                },
                Err(e) => e,
            };

            counter!("fetch_attempt_errors_total").increment(1);
            if attempt < self.max_retries {
                tracing::debug!(url, attempt, error = %err, "fetch failed, retrying");
                tokio::time::sleep(backoff(attempt)).await;
                continue;
            }
            return Err(SourceError::fetch(url, err));
        }
    }
}

/// Delay before the next attempt: 500ms doubling per attempt, capped at 32s.
fn backoff(attempt: u8) -> Duration {
    let exp = attempt.saturating_sub(1).min(6);
    Duration::from_millis(500u64 << exp)
}

/// In-memory fetcher keyed by URL. Unknown URLs fail like a 404.
#[derive(Debug, Default, Clone)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::fetch(url, "no fixture for url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_fetcher_serves_known_urls_only() {
        let f = FixtureFetcher::new().with_page("http://a/", "body");
        assert_eq!(f.get_text("http://a/").await.unwrap(), "body");
        assert!(matches!(
            f.get_text("http://b/").await,
            Err(SourceError::Fetch { .. })
        ));
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1_000));
        assert_eq!(backoff(7), Duration::from_millis(32_000));
        assert_eq!(backoff(100), Duration::from_millis(32_000));
        assert_eq!(backoff(u8::MAX), Duration::from_millis(32_000));
    }

    #[test]
    fn http_fetcher_keeps_at_least_one_attempt() {
        let f = HttpFetcher::new(&HttpConfig::default())
            .unwrap()
            .with_retries(0)
            .with_timeout(3);
        assert_eq!(f.max_retries, 1);
        assert_eq!(f.timeout, Duration::from_secs(3));
    }
}
