use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::app::Result;
use crate::domain::{Query, Record};
use crate::fetcher::{FetchRequest, Fetcher};
use crate::sources::{json, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const HOME_URL: &str = "https://www.herold.at/";
const PAGE_SIZE: u32 = 30;

/// herold.at: Next.js data endpoint keyed by the site's current build id.
pub struct Austria;

/// Next.js build id embedded in the home page.
fn build_id(home_page: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#""buildId":\s*"([a-zA-Z0-9-]+)""#).expect("valid pattern"));
    pattern.captures(home_page).map(|caps| caps[1].to_string())
}

fn parse_node(node: &Value) -> Record {
    Record {
        name: json::str_at(node, "/name"),
        categories: json::str_at(node, "/industry"),
        phone: join_unique(json::strings_at(node, "/tel")),
        email: String::new(),
        address: json::str_at(node, "/address"),
        city: json::str_at(node, "/city"),
        region: json::str_at(node, "/state"),
        postal_code: json::str_at(node, "/zip"),
    }
}

#[async_trait]
impl Source for Austria {
    fn id(&self) -> &'static str {
        "austria"
    }

    fn display_name(&self) -> &'static str {
        "Austria"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Listing
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    async fn prepare(
        &self,
        query: &Query,
        fetcher: &(dyn Fetcher + Send + Sync),
    ) -> Option<SearchContext> {
        let mut ctx = SearchContext::from(query);

        let geo = FetchRequest::get(format!(
            "https://www.herold.at/api/geo/search/?term={}",
            urlencoding::encode(&query.location)
        ));
        if let Ok(value) = json::parse(&fetcher.fetch(&geo).await) {
            let label = json::str_at(&value, "/0/label");
            if !label.is_empty() {
                debug!("Location '{}' resolved to '{}'", query.location, label);
                ctx.location = label;
            }
        }

        let home_page = fetcher.fetch(&FetchRequest::get(HOME_URL)).await;
        match build_id(&home_page) {
            Some(token) => {
                ctx.token = Some(token);
                Some(ctx)
            }
            None => {
                warn!("No build id on {}, skipping {}", HOME_URL, query);
                None
            }
        }
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        let base = format!(
            "https://www.herold.at/_next/data/{}/gelbe-seiten/suche.json",
            ctx.token.as_deref().unwrap_or_default()
        );
        let page = page.to_string();
        let url = Url::parse_with_params(
            &base,
            &[
                ("userTerm", ctx.keyword.as_str()),
                ("geoLabel", ctx.location.as_str()),
                ("seite", page.as_str()),
            ],
        )
        .map(String::from)
        .unwrap_or_default();
        FetchRequest::get(url)
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let value = json::parse(body)?;

        let records = json::array_at(&value, "/pageProps/results/nodes")
            .iter()
            .map(parse_node)
            .collect();
        let total = json::u64_at(&value, "/pageProps/results/totalCount").unwrap_or(0);

        Ok(SearchPage {
            records,
            previews: Vec::new(),
            page_count: page_count(total, PAGE_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves canned bodies by URL; anything else is an empty body.
    struct Canned(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl Fetcher for Canned {
        async fn fetch(&self, request: &FetchRequest) -> String {
            self.0.get(request.url.as_str()).copied().unwrap_or_default().to_string()
        }
    }

    const GEO_URL: &str = "https://www.herold.at/api/geo/search/?term=wien";
    const HOME: &str = r#"<script id="__NEXT_DATA__">{"props":{},"buildId": "Ab3-xYz9","page":"/"}</script>"#;

    #[test]
    fn test_build_id() {
        assert_eq!(build_id(HOME), Some("Ab3-xYz9".to_string()));
        assert_eq!(build_id("<html></html>"), None);
    }

    #[tokio::test]
    async fn test_prepare_resolves_location_and_token() {
        let fetcher = Canned(HashMap::from([
            (GEO_URL, r#"[{"label": "Wien"}, {"label": "Wiener Neustadt"}]"#),
            (HOME_URL, HOME),
        ]));
        let ctx = Austria
            .prepare(&Query::new("cafe", "wien"), &fetcher)
            .await
            .unwrap();
        assert_eq!(ctx.location, "Wien");
        assert_eq!(ctx.token.as_deref(), Some("Ab3-xYz9"));
    }

    #[tokio::test]
    async fn test_prepare_without_build_id_ends_query() {
        let fetcher = Canned(HashMap::from([(GEO_URL, r#"[{"label": "Wien"}]"#)]));
        assert!(Austria
            .prepare(&Query::new("cafe", "wien"), &fetcher)
            .await
            .is_none());
    }

    #[test]
    fn test_search_request() {
        let ctx = SearchContext {
            keyword: "cafe".into(),
            location: "Wien".into(),
            token: Some("Ab3-xYz9".into()),
        };
        assert_eq!(
            Austria.search_request(&ctx, 2).url,
            "https://www.herold.at/_next/data/Ab3-xYz9/gelbe-seiten/suche.json?userTerm=cafe&geoLabel=Wien&seite=2"
        );
    }

    #[test]
    fn test_parse_search_page() {
        let body = r#"{"pageProps": {"results": {
          "totalCount": 61,
          "nodes": [
            {"name": "Café Central", "industry": "Kaffeehaus", "tel": ["+43 1 5333764", "+43 1 5333764"],
             "address": "Herrengasse 14", "zip": "1010", "city": "Wien", "state": "Wien"},
            {"name": "", "industry": "Kaffeehaus"}
          ]
        }}}"#;
        let page = Austria.parse_search_page(body).unwrap();
        assert_eq!(page.page_count, 3);
        assert!(page.previews.is_empty());
        assert_eq!(page.records.len(), 2);
        assert_eq!(
            page.records[0],
            Record {
                name: "Café Central".into(),
                categories: "Kaffeehaus".into(),
                phone: "+43 1 5333764".into(),
                email: String::new(),
                address: "Herrengasse 14".into(),
                city: "Wien".into(),
                region: "Wien".into(),
                postal_code: "1010".into(),
            }
        );
        assert!(!page.records[1].is_valid());
    }
}
