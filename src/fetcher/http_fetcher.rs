use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Proxy};
use tokio::sync::Semaphore;

use crate::app::{HarvestError, Result};
use crate::config::HttpConfig;
use crate::fetcher::{FetchRequest, Fetcher, Method, ProxyEntry, ProxyPool, RunSignal};

/// How many times a request is tried and how long to pause between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            max_jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Uniform random pause in `[0, max_jitter)`.
    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
    }
}

/// reqwest-backed fetcher shared by every query of a batch.
///
/// Holds one client per proxy plus a direct client, all built with the same
/// headers and TLS policy. Every call takes a permit from the shared
/// semaphore for its whole duration.
pub struct HttpFetcher {
    direct: Client,
    proxied: HashMap<ProxyEntry, Client>,
    proxies: Arc<ProxyPool>,
    semaphore: Arc<Semaphore>,
    signal: RunSignal,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(
        config: &HttpConfig,
        proxies: Arc<ProxyPool>,
        semaphore: Arc<Semaphore>,
        signal: RunSignal,
    ) -> Result<Self> {
        let direct = build_client(config, None)?;

        let mut proxied = HashMap::new();
        for entry in proxies.entries() {
            match Proxy::all(entry.as_str()) {
                Ok(proxy) => {
                    proxied.insert(entry.clone(), build_client(config, Some(proxy))?);
                }
                Err(e) => {
                    tracing::warn!("Unusable proxy '{}', requests will go direct: {}", entry, e);
                }
            }
        }

        Ok(Self {
            direct,
            proxied,
            proxies,
            semaphore,
            signal,
            retry: config.retry_policy(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn client_for(&self, proxy: Option<&ProxyEntry>) -> &Client {
        proxy
            .and_then(|entry| self.proxied.get(entry))
            .unwrap_or(&self.direct)
    }

    /// One attempt. `Ok(None)` means the server answered with a non-success status.
    async fn attempt(&self, client: &Client, request: &FetchRequest) -> Result<Option<String>> {
        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %request.url, status = status.as_u16(), "Non-success status");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> String {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!("Request semaphore closed: {}", e);
                return String::new();
            }
        };

        for attempt in 1..=self.retry.attempts {
            if self.signal.is_stopped() {
                tracing::debug!(url = %request.url, "Run stopped, skipping request");
                return String::new();
            }

            let proxy = self.proxies.get();
            match self.attempt(self.client_for(proxy), request).await {
                Ok(Some(body)) => return body,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(url = %request.url, attempt, "Request failed: {}", e);
                }
            }

            if attempt < self.retry.attempts {
                tokio::time::sleep(self.retry.jitter()).await;
            }
        }

        tracing::warn!(
            url = %request.url,
            "Giving up after {} attempts",
            self.retry.attempts
        );
        String::new()
    }
}

fn build_client(config: &HttpConfig, proxy: Option<Proxy>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value(&config.accept)?);
    headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

    // Certificate checks are off by default so intercepting proxies work.
    let mut builder = Client::builder()
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .danger_accept_invalid_certs(config.accept_invalid_certs);

    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| HarvestError::Config(format!("Invalid header value '{}': {}", value, e)))
}
