use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{Preview, Query, Record};
use crate::fetcher::{Fetcher, RunSignal};
use crate::progress::ProgressSink;
use crate::sources::{SearchContext, SearchPage, Source};

/// Page cap for sources that do not declare their own.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Runs one query against one source: prepare, first page, then the
/// remaining pages and any detail pages, all fanned out concurrently.
///
/// Never fails. Unreadable pages and empty bodies are skipped, and a stopped
/// [`RunSignal`] ends the walk at the next fan-out boundary.
pub struct SourceDriver {
    source: Arc<dyn Source>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    progress: Arc<dyn ProgressSink>,
    signal: RunSignal,
    max_pages: u32,
}

impl SourceDriver {
    pub fn new(
        source: Arc<dyn Source>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        progress: Arc<dyn ProgressSink>,
        signal: RunSignal,
    ) -> Self {
        Self {
            source,
            fetcher,
            progress,
            signal,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Upper bound on search pages per query, whatever the site reports.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    pub async fn run(&self, query: &Query) -> Vec<Record> {
        if self.signal.is_stopped() {
            return Vec::new();
        }

        let Some(ctx) = self.source.prepare(query, self.fetcher.as_ref()).await else {
            tracing::info!("{}: nothing to search for {}", self.source.id(), query);
            return Vec::new();
        };
        if self.signal.is_stopped() {
            return Vec::new();
        }

        let body = self
            .fetcher
            .fetch(&self.source.search_request(&ctx, 1))
            .await;
        if body.is_empty() {
            tracing::debug!("{}: empty first page for {}", self.source.id(), query);
            return Vec::new();
        }

        let first = match self.source.parse_search_page(&body) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("{}: unreadable first page for {}: {}", self.source.id(), query, e);
                return Vec::new();
            }
        };

        let cap = match self.source.max_pages() {
            Some(max) => max.min(self.max_pages),
            None => self.max_pages,
        };
        if first.page_count > cap {
            tracing::warn!(
                "{}: {} pages reported for {}, fetching the first {}",
                self.source.id(),
                first.page_count,
                query,
                cap
            );
        }
        let pages = first.page_count.clamp(1, cap);
        tracing::debug!("{}: {} page(s) for {}", self.source.id(), pages, query);

        let (mut records, rest) =
            futures::join!(self.collect_page(first), self.fetch_remaining(&ctx, pages));
        records.extend(rest);

        tracing::info!(
            "{}: {} record(s) for {}",
            self.source.id(),
            records.len(),
            query
        );
        records
    }

    async fn fetch_remaining(&self, ctx: &SearchContext, pages: u32) -> Vec<Record> {
        if pages < 2 || self.signal.is_stopped() {
            return Vec::new();
        }

        join_all((2..=pages).map(|page| self.fetch_page(ctx, page)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn fetch_page(&self, ctx: &SearchContext, page: u32) -> Vec<Record> {
        if self.signal.is_stopped() {
            return Vec::new();
        }

        let body = self
            .fetcher
            .fetch(&self.source.search_request(ctx, page))
            .await;
        if body.is_empty() {
            return Vec::new();
        }

        match self.source.parse_search_page(&body) {
            Ok(parsed) => self.collect_page(parsed).await,
            Err(e) => {
                tracing::warn!("{}: skipping page {}: {}", self.source.id(), page, e);
                Vec::new()
            }
        }
    }

    /// Confirm the page's own records and resolve its previews.
    async fn collect_page(&self, page: SearchPage) -> Vec<Record> {
        let mut records: Vec<Record> = page
            .records
            .into_iter()
            .filter_map(|record| self.confirm(record))
            .collect();

        if page.previews.is_empty() || self.signal.is_stopped() {
            return records;
        }

        let details = join_all(page.previews.iter().map(|preview| self.fetch_detail(preview))).await;
        records.extend(details.into_iter().flatten());
        records
    }

    async fn fetch_detail(&self, preview: &Preview) -> Option<Record> {
        if self.signal.is_stopped() {
            return None;
        }

        let body = self.fetcher.fetch(&self.source.detail_request(preview)).await;
        if body.is_empty() {
            return None;
        }

        match self.source.parse_detail_page(&body) {
            Ok(record) => self.confirm(record),
            Err(e) => {
                tracing::warn!(
                    "{}: skipping {}: {}",
                    self.source.id(),
                    preview.display_name(),
                    e
                );
                None
            }
        }
    }

    fn confirm(&self, record: Record) -> Option<Record> {
        if !record.is_valid() {
            return None;
        }
        self.progress.on_increment(1);
        Some(record)
    }
}
