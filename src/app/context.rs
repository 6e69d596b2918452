use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::{Fetcher, HttpFetcher, ProxyPool, RunSignal};
use crate::harvest::Orchestrator;
use crate::progress::ProgressCounter;

/// Everything one harvesting batch shares: the request bound, the proxy
/// rotation, the run signal, the HTTP session and the progress counter.
pub struct AppContext {
    pub config: Config,
    pub proxies: Arc<ProxyPool>,
    pub semaphore: Arc<Semaphore>,
    pub signal: RunSignal,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub progress: Arc<ProgressCounter>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let proxies = Arc::new(ProxyPool::load(&config.proxy_file)?);
        Self::with_proxies(config, proxies)
    }

    pub fn with_proxies(config: Config, proxies: Arc<ProxyPool>) -> Result<Self> {
        let semaphore = Arc::new(Semaphore::new(config.http.workers.max(1)));
        let signal = RunSignal::new();
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(
            &config.http,
            proxies.clone(),
            semaphore.clone(),
            signal.clone(),
        )?);

        if proxies.is_empty() {
            tracing::info!("No proxies loaded, connecting directly");
        } else {
            tracing::info!("Loaded {} proxies", proxies.len());
        }

        Ok(Self {
            config,
            proxies,
            semaphore,
            signal,
            fetcher,
            progress: Arc::new(ProgressCounter::new()),
        })
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.fetcher.clone(),
            self.progress.clone(),
            self.signal.clone(),
        )
        .with_max_pages(self.config.max_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_context_from_defaults() {
        let mut config = Config::default();
        config.proxy_file = "/nonexistent/gleaner/.proxies".into();
        config.http.workers = 4;

        let ctx = AppContext::new(config).unwrap();
        assert!(ctx.proxies.is_empty());
        assert_eq!(ctx.semaphore.available_permits(), 4);
        assert!(ctx.signal.is_stopped());
        assert_eq!(ctx.progress.total(), 0);
    }

    #[tokio::test]
    async fn test_context_loads_proxy_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "10.0.0.1:1080:user:pass").unwrap();
        writeln!(file, "10.0.0.2:1080:user:pass").unwrap();

        let mut config = Config::default();
        config.proxy_file = file.path().to_path_buf();

        let ctx = AppContext::new(config).unwrap();
        assert_eq!(ctx.proxies.len(), 2);
    }

    #[tokio::test]
    async fn test_stopped_context_orchestrates_nothing() {
        let mut config = Config::default();
        config.proxy_file = "/nonexistent/gleaner/.proxies".into();
        let ctx = AppContext::new(config).unwrap();

        let source = crate::sources::find("usa").unwrap();
        let records = ctx
            .orchestrator()
            .run(source, vec![crate::domain::Query::new("cafe", "paris")])
            .await;
        assert!(records.is_empty());
    }
}
