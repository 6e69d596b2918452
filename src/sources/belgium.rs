use crate::app::Result;
use crate::domain::{Preview, Record};
use crate::fetcher::FetchRequest;
use crate::sources::{html, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const BASE_URL: &str = "https://www.goldenpages.be/";
const PAGE_SIZE: u32 = 20;

/// goldenpages.be: HTML search results linking to HTML detail pages.
pub struct Belgium;

impl Source for Belgium {
    fn id(&self) -> &'static str {
        "belgium"
    }

    fn display_name(&self) -> &'static str {
        "Belgium"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Detail
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        FetchRequest::get(format!(
            "https://www.goldenpages.be/search/{}/{}/{}",
            urlencoding::encode(&ctx.keyword),
            urlencoding::encode(&ctx.location),
            page
        ))
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let doc = html::document(body);
        let root = doc.root_element();

        let mut previews = Vec::new();
        for item in html::select(root, "[itemprop='itemListElement']")? {
            let name = html::first_text(item, "h2[itemprop='name'] > span")?;
            if name.is_empty() {
                continue;
            }
            let href = html::first_attr(item, "a[data-ta='MoreInfoClick']", "href")?;
            previews.push(Preview::named(name, html::absolute_url(BASE_URL, &href)));
        }

        let total = html::digits(&html::first_text(root, "span.count")?).unwrap_or(0);

        Ok(SearchPage {
            records: Vec::new(),
            previews,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    fn parse_detail_page(&self, body: &str) -> Result<Record> {
        let doc = html::document(body);
        let root = doc.root_element();

        let phones: Vec<String> = html::all_attr(root, "a[href*='tel']", "href")?
            .iter()
            .map(|href| html::strip_prefix_ci(href, "tel:").to_string())
            .collect();

        let email = html::first_attr(root, "a[href*='mailto']", "href")?;
        let email = email.split('?').next().unwrap_or_default();

        Ok(Record {
            name: html::first_text(root, "h1[itemprop='name'] > span")?,
            categories: join_unique(html::all_text(root, "a.category")?),
            phone: join_unique(phones),
            email: html::strip_prefix_ci(email, "mailto:").to_string(),
            address: html::first_text(root, "span[data-yext='street']")?,
            city: html::first_text(root, "span[data-yext='city-district']")?,
            region: html::first_text(root, "span[data-yext='city']")?,
            postal_code: html::first_text(root, "span[data-yext='postal-code']")?,
        })
    }
}
