use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::app::Result;
use crate::domain::{Preview, Query, Record};
use crate::fetcher::{FetchRequest, Fetcher};
use crate::sources::{
    html, json, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel,
};

const BASE_URL: &str = "https://www.dastelefonbuch.de/";
const PAGE_SIZE: u32 = 10;
const MAX_PAGES: u32 = 50;

/// dastelefonbuch.de: HTML search results linking to HTML detail pages.
pub struct Germany;

/// Decode a Cloudflare `data-cfemail` value: the first byte is the XOR key
/// for every following byte.
fn decode_cf_email(encoded: &str) -> String {
    let bytes: Option<Vec<u8>> = (0..encoded.len())
        .step_by(2)
        .map(|i| {
            encoded
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        })
        .collect();

    match bytes.as_deref() {
        Some([key, rest @ ..]) => rest.iter().map(|b| char::from(b ^ key)).collect(),
        _ => String::new(),
    }
}

/// First number in the hits line; "1.234 Treffer" reads as 1234.
fn parse_hits(text: &str) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"\d[\d.]*").expect("valid pattern"));
    let number = pattern.find(text)?.as_str().replace('.', "");
    number.parse().ok()
}

/// "Hauptstr. 5, Mitte, 10115 Berlin" becomes "Hauptstr. 5, 10115 Berlin".
fn shorten_address(parts: &[String]) -> String {
    let joined = join_unique(parts);
    let pieces: Vec<&str> = joined
        .split(',')
        .map(|piece| piece.trim_matches(|c: char| c.is_whitespace() || c == ','))
        .filter(|piece| !piece.is_empty())
        .collect();

    match pieces.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, .., last] => format!("{first}, {last}"),
    }
}

#[async_trait]
impl Source for Germany {
    fn id(&self) -> &'static str {
        "germany"
    }

    fn display_name(&self) -> &'static str {
        "Germany"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Detail
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn max_pages(&self) -> Option<u32> {
        Some(MAX_PAGES)
    }

    /// Swap the free-text location for the site's own spelling of it.
    async fn prepare(
        &self,
        query: &Query,
        fetcher: &(dyn Fetcher + Send + Sync),
    ) -> Option<SearchContext> {
        let mut ctx = SearchContext::from(query);
        let request = FetchRequest::get(format!(
            "https://www.dastelefonbuch.de/service/suggestor/location/{}?kw=",
            urlencoding::encode(&query.location)
        ));

        let body = fetcher.fetch(&request).await;
        if let Ok(value) = json::parse(&body) {
            let suggested = json::str_at(&value, "/suggest/suggestions/0/name");
            if !suggested.is_empty() {
                debug!("Location '{}' resolved to '{}'", query.location, suggested);
                ctx.location = suggested;
            }
        }
        Some(ctx)
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        FetchRequest::get(format!(
            "https://www.dastelefonbuch.de/Suche/{}/{}/{}",
            urlencoding::encode(&ctx.keyword),
            urlencoding::encode(&ctx.location),
            page
        ))
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let doc = html::document(body);
        let root = doc.root_element();

        let mut previews = Vec::new();
        for entry in html::select(root, "div.entry")? {
            let name = html::first_text(entry, "span[itemprop='name']")?;
            if name.is_empty() {
                continue;
            }
            let href = html::first_attr(entry, "a.todetails", "href")?;
            previews.push(Preview::named(name, html::absolute_url(BASE_URL, &href)));
        }

        let total = parse_hits(&html::first_text(root, "p.hits")?).unwrap_or(0);

        Ok(SearchPage {
            records: Vec::new(),
            previews,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    fn parse_detail_page(&self, body: &str) -> Result<Record> {
        let doc = html::document(body);
        let root = doc.root_element();

        let phone = html::first_attr(root, "div#mainPhone a", "href")?;
        let street = html::first_text(root, "span[itemprop='streetAddress']")?;
        let address = if street.is_empty() {
            shorten_address(&html::own_text(root, "address")?)
        } else {
            street
        };

        Ok(Record {
            name: html::first_text(root, "h1[itemprop='name']")?,
            categories: html::first_text(root, "div.category a")?,
            phone: html::strip_prefix_ci(&phone, "tel:").to_string(),
            email: decode_cf_email(&html::first_attr(
                root,
                "span.__cf_email__",
                "data-cfemail",
            )?),
            address,
            city: html::first_text(root, "span[itemprop='addressLocality']")?,
            region: String::new(),
            postal_code: html::first_text(root, "span[itemprop='postalCode']")?,
        })
    }
}
