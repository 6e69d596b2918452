use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::app::{HarvestError, Result};
use crate::domain::{Preview, Record};
use crate::fetcher::FetchRequest;
use crate::sources::{html, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const BASE_URL: &str = "https://www.yellowpages.com/";
const PAGE_SIZE: u32 = 30;

/// yellowpages.com: HTML search results linking to HTML detail pages.
pub struct Usa;

/// Street, city, state and ZIP from the `.address` markup.
fn parse_address(markup: &str) -> (String, String, String, String) {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"<span>([^<]+)</span>([^,]+), ([A-Z]{2}) (\d{5})").expect("valid pattern")
    });

    match pattern.captures(markup) {
        Some(caps) => (
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
            caps[3].to_string(),
            caps[4].to_string(),
        ),
        None => Default::default(),
    }
}

impl Source for Usa {
    fn id(&self) -> &'static str {
        "usa"
    }

    fn display_name(&self) -> &'static str {
        "USA"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Detail
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        let page = page.to_string();
        let url = Url::parse_with_params(
            "https://www.yellowpages.com/search",
            &[
                ("search_terms", ctx.keyword.as_str()),
                ("geo_location_terms", ctx.location.as_str()),
                ("page", page.as_str()),
            ],
        )
        .map(String::from)
        .unwrap_or_default();
        FetchRequest::get(url)
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let doc = html::document(body);
        let root = doc.root_element();

        let mut previews = Vec::new();
        for result in html::select(root, ".organic div.result")? {
            let name = html::first_text(result, "a.business-name")?;
            if name.is_empty() {
                continue;
            }
            let href = html::first_attr(result, "a.business-name", "href")?;
            previews.push(Preview::named(name, html::absolute_url(BASE_URL, &href)));
        }

        let counters = html::all_text(root, ".pagination > span")?;
        let total = html::total_from_of_phrase(&counters).unwrap_or(0);

        Ok(SearchPage {
            records: Vec::new(),
            previews,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    fn parse_detail_page(&self, body: &str) -> Result<Record> {
        if body.trim().is_empty() {
            return Err(HarvestError::Parse("empty detail page".into()));
        }
        let doc = html::document(body);
        let root = doc.root_element();

        let (address, city, region, postal_code) = parse_address(&html::outer_html(root, ".address")?);
        let phone = html::first_attr(root, ".phone", "href")?;
        let email = html::first_attr(root, ".email-business", "href")?;

        Ok(Record {
            name: html::first_text(root, "h1.business-name")?,
            categories: join_unique(html::all_text(root, ".categories > a")?),
            phone: html::strip_prefix_ci(&phone, "tel:").to_string(),
            email: html::strip_prefix_ci(&email, "mailto:").to_string(),
            address,
            city,
            region,
            postal_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"
      <div class="search-results organic">
        <div class="result"><a class="business-name" href="/nyc/mip/joes-coffee-1"><span>Joe's Coffee</span></a></div>
        <div class="result"><a class="business-name" href="/nyc/mip/daily-grind-2">Daily Grind</a></div>
        <div class="result"><a class="business-name" href="/nowhere"></a></div>
      </div>
      <div class="pagination"><span>Showing 1-30 of 95</span></div>
    "#;

    const DETAIL: &str = r#"
      <h1 class="business-name">Joe's Coffee</h1>
      <div class="categories"><a>Coffee Shops</a><a>Cafes</a><a>Coffee Shops</a></div>
      <a class="phone" href="tel:(212) 555-0100">Call</a>
      <a class="email-business" href="mailto:hello@joes.example">Email</a>
      <div class="address"><span>141 Waverly Pl</span>New York, NY 10014</div>
    "#;

    #[test]
    fn test_search_request_encodes_terms() {
        let ctx = SearchContext {
            keyword: "coffee shop".into(),
            location: "New York, NY".into(),
            token: None,
        };
        let request = Usa.search_request(&ctx, 2);
        assert_eq!(
            request.url,
            "https://www.yellowpages.com/search?search_terms=coffee+shop&geo_location_terms=New+York%2C+NY&page=2"
        );
    }

    #[test]
    fn test_parse_search_page() {
        let page = Usa.parse_search_page(SEARCH).unwrap();
        assert_eq!(
            page.previews,
            vec![
                Preview::named(
                    "Joe's Coffee",
                    "https://www.yellowpages.com/nyc/mip/joes-coffee-1"
                ),
                Preview::named(
                    "Daily Grind",
                    "https://www.yellowpages.com/nyc/mip/daily-grind-2"
                ),
            ]
        );
        assert_eq!(page.page_count, 4);
    }

    #[test]
    fn test_missing_total_is_one_page() {
        let page = Usa.parse_search_page("<html></html>").unwrap();
        assert!(page.previews.is_empty());
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn test_parse_detail_page() {
        let record = Usa.parse_detail_page(DETAIL).unwrap();
        assert_eq!(
            record,
            Record {
                name: "Joe's Coffee".into(),
                categories: "Coffee Shops, Cafes".into(),
                phone: "(212) 555-0100".into(),
                email: "hello@joes.example".into(),
                address: "141 Waverly Pl".into(),
                city: "New York".into(),
                region: "NY".into(),
                postal_code: "10014".into(),
            }
        );
    }

    #[test]
    fn test_detail_without_name_is_invalid() {
        let record = Usa
            .parse_detail_page("<div class=\"categories\"><a>Cafes</a></div>")
            .unwrap();
        assert!(!record.is_valid());
    }
}
