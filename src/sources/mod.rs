//! Directory sites Gleaner can harvest.
//!
//! Each site implements [`Source`]: how to build its search requests, how to
//! read a search page (records directly, or previews pointing at detail
//! pages), how to read a detail page, and how many pages to expect. The
//! fetching and fan-out live in [`crate::harvest`]; everything here is pure
//! except the optional [`Source::prepare`] lookup.
//!
//! ```text
//! Query → prepare → search_request(1) → parse_search_page → page_count
//!                    search_request(2..N) ─┘      └→ previews → detail_request → parse_detail_page
//! ```

mod austria;
mod belgium;
mod canada;
mod germany;
mod ireland;
mod italy;
mod nicaragua;
mod south_africa;
mod switzerland;
mod usa;

pub mod html;
pub mod json;

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;

use crate::app::{HarvestError, Result};
use crate::domain::{Preview, Query, Record};
use crate::fetcher::{FetchRequest, Fetcher};

pub use austria::Austria;
pub use belgium::Belgium;
pub use canada::Canada;
pub use germany::Germany;
pub use ireland::Ireland;
pub use italy::Italy;
pub use nicaragua::Nicaragua;
pub use south_africa::SouthAfrica;
pub use switzerland::Switzerland;
pub use usa::Usa;

/// Separator for multi-valued fields.
pub const FIELD_SEPARATOR: &str = ", ";

/// Whether a search page carries full records or only links to detail pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceModel {
    Listing,
    Detail,
}

/// Query terms after the source's INIT step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    pub keyword: String,
    pub location: String,
    /// Site-specific value discovered during preparation (e.g. a build id).
    pub token: Option<String>,
}

impl From<&Query> for SearchContext {
    fn from(query: &Query) -> Self {
        Self {
            keyword: query.keyword.clone(),
            location: query.location.clone(),
            token: None,
        }
    }
}

/// Everything read from one search page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub records: Vec<Record>,
    pub previews: Vec<Preview>,
    /// Total number of search pages, always at least 1.
    pub page_count: u32,
}

#[async_trait]
pub trait Source: Send + Sync {
    /// Registry key, lowercase with underscores.
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn model(&self) -> SourceModel;

    /// Results per search page, used to derive the page count.
    fn page_size(&self) -> u32;

    /// Hard upper bound on pages the site will serve.
    fn max_pages(&self) -> Option<u32> {
        None
    }

    /// Fixed location values, for sites that do not accept free text.
    fn locations(&self) -> Option<Vec<&'static str>> {
        None
    }

    /// Resolve the query before the first search request.
    ///
    /// `None` ends the query with no results.
    async fn prepare(
        &self,
        query: &Query,
        _fetcher: &(dyn Fetcher + Send + Sync),
    ) -> Option<SearchContext> {
        Some(SearchContext::from(query))
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest;

    fn parse_search_page(&self, body: &str) -> Result<SearchPage>;

    fn detail_request(&self, preview: &Preview) -> FetchRequest {
        FetchRequest::get(preview.url.as_str())
    }

    /// Read one detail page. An empty name means nothing usable was found.
    fn parse_detail_page(&self, _body: &str) -> Result<Record> {
        Err(HarvestError::Parse(format!(
            "{} does not use detail pages",
            self.id()
        )))
    }
}

/// `ceil(total / page_size)`, never below 1.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 || total == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Deduplicate trimmed, non-empty values (first occurrence wins) and join them.
pub fn join_unique<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if !value.is_empty() && seen.insert(value.to_string()) {
            unique.push(value.to_string());
        }
    }
    unique.join(FIELD_SEPARATOR)
}

/// Every known source, in display order.
pub fn registry() -> &'static [Arc<dyn Source>] {
    static REGISTRY: OnceLock<Vec<Arc<dyn Source>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            Arc::new(Austria),
            Arc::new(Belgium),
            Arc::new(Canada),
            Arc::new(Germany),
            Arc::new(Ireland),
            Arc::new(Italy),
            Arc::new(Nicaragua),
            Arc::new(Switzerland),
            Arc::new(SouthAfrica),
            Arc::new(Usa),
        ]
    })
}

/// Look up a source by id or display name ("South Africa" finds `south_africa`).
pub fn find(name: &str) -> Result<Arc<dyn Source>> {
    let key = name.trim().to_lowercase().replace(' ', "_");
    registry()
        .iter()
        .find(|source| source.id() == key)
        .cloned()
        .ok_or_else(|| HarvestError::UnknownSource(name.to_string()))
}
