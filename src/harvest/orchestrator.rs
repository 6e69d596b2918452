use std::sync::Arc;

use crate::domain::{Query, Record};
use crate::fetcher::{Fetcher, RunSignal};
use crate::harvest::{SourceDriver, DEFAULT_MAX_PAGES};
use crate::progress::ProgressSink;
use crate::sources::Source;

/// Runs a batch of queries against one source, one task per query.
pub struct Orchestrator {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    progress: Arc<dyn ProgressSink>,
    signal: RunSignal,
    max_pages: u32,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        progress: Arc<dyn ProgressSink>,
        signal: RunSignal,
    ) -> Self {
        Self {
            fetcher,
            progress,
            signal,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Aggregate every query's records in no particular order. A query whose
    /// task panics contributes nothing; its siblings carry on.
    pub async fn run(&self, source: Arc<dyn Source>, queries: Vec<Query>) -> Vec<Record> {
        let driver = Arc::new(SourceDriver::new(
            source,
            self.fetcher.clone(),
            self.progress.clone(),
            self.signal.clone(),
        )
        .with_max_pages(self.max_pages));

        let mut handles = Vec::new();
        for query in queries {
            if self.signal.is_stopped() {
                tracing::info!("Run stopped, skipping {}", query);
                continue;
            }

            let driver = driver.clone();
            let label = query.to_string();
            let handle = tokio::spawn(async move { driver.run(&query).await });
            handles.push((label, handle));
        }

        let mut records = Vec::new();
        for (label, handle) in handles {
            match handle.await {
                Ok(found) => records.extend(found),
                Err(e) => {
                    tracing::error!("Query {} failed: {}", label, e);
                }
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::stub::{StubFetcher, StubSource};
    use crate::progress::ProgressCounter;

    fn orchestrator(
        fetcher: &Arc<StubFetcher>,
        progress: &Arc<ProgressCounter>,
        signal: RunSignal,
    ) -> Orchestrator {
        Orchestrator::new(fetcher.clone(), progress.clone(), signal)
    }

    #[tokio::test]
    async fn test_aggregates_all_queries() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.page("cafe", "paris", 1, r#"{"records": ["Le Café", "Café Nuit"]}"#);
        fetcher.page(
            "bakery",
            "berlin",
            1,
            r#"{"records": ["Brot", "Kuchen", "Brezel"]}"#,
        );
        let progress = Arc::new(ProgressCounter::new());

        let queries = vec![Query::new("cafe", "paris"), Query::new("bakery", "berlin")];
        let records = orchestrator(&fetcher, &progress, RunSignal::started())
            .run(Arc::new(StubSource::listing(30)), queries)
            .await;

        assert_eq!(records.len(), 5);
        assert_eq!(progress.total(), 5);
    }

    #[tokio::test]
    async fn test_failed_query_does_not_abort_siblings() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.page("cafe", "paris", 1, r#"{"records": ["Le Café"]}"#);
        fetcher.page("bakery", "berlin", 1, "garbage");
        let progress = Arc::new(ProgressCounter::new());

        let queries = vec![Query::new("cafe", "paris"), Query::new("bakery", "berlin")];
        let records = orchestrator(&fetcher, &progress, RunSignal::started())
            .run(Arc::new(StubSource::listing(30)), queries)
            .await;

        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_query_does_not_abort_siblings() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.page("cafe", "paris", 1, r#"{"records": ["Le Café"]}"#);
        fetcher.page("bakery", "berlin", 1, "panic");
        let progress = Arc::new(ProgressCounter::new());

        let queries = vec![Query::new("cafe", "paris"), Query::new("bakery", "berlin")];
        let records = orchestrator(&fetcher, &progress, RunSignal::started())
            .run(Arc::new(StubSource::listing(30)), queries)
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Le Café");
    }

    #[tokio::test]
    async fn test_page_cap_reaches_every_query() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.page("cafe", "paris", 1, r#"{"total": 4000000000, "records": ["A"]}"#);
        fetcher.page("bakery", "berlin", 1, r#"{"total": 4000000000, "records": ["B"]}"#);
        let progress = Arc::new(ProgressCounter::new());

        let queries = vec![Query::new("cafe", "paris"), Query::new("bakery", "berlin")];
        orchestrator(&fetcher, &progress, RunSignal::started())
            .with_max_pages(3)
            .run(Arc::new(StubSource::listing(1)), queries)
            .await;

        assert_eq!(fetcher.requested().len(), 6);
    }

    #[tokio::test]
    async fn test_stopped_run_skips_queries() {
        let fetcher = Arc::new(StubFetcher::new());
        fetcher.page("cafe", "paris", 1, r#"{"records": ["Le Café"]}"#);
        let progress = Arc::new(ProgressCounter::new());

        let records = orchestrator(&fetcher, &progress, RunSignal::new())
            .run(
                Arc::new(StubSource::listing(30)),
                vec![Query::new("cafe", "paris")],
            )
            .await;

        assert!(records.is_empty());
        assert!(fetcher.requested().is_empty());
    }
}
