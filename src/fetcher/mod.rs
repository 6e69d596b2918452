pub mod http_fetcher;
pub mod proxy;
pub mod signal;

use async_trait::async_trait;
use serde_json::Value;

pub use http_fetcher::{HttpFetcher, RetryPolicy};
pub use proxy::{ProxyEntry, ProxyPool};
pub use signal::RunSignal;

/// Maximum number of HTTP requests in flight across a whole batch.
pub const DEFAULT_WORKERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One HTTP call a source wants made.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub json: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            json: None,
            headers: Vec::new(),
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            json: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Fetches a page body.
///
/// Implementations never fail: a transport error, a non-success status after
/// all retries, or a stopped run signal all yield an empty string.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, request: &FetchRequest) -> String;
}
