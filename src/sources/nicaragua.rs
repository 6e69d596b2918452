use scraper::ElementRef;

use crate::app::Result;
use crate::domain::Record;
use crate::fetcher::FetchRequest;
use crate::sources::{html, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const PAGE_SIZE: u32 = 20;
const CATEGORY_SELECTOR: &str =
    r"div > div:nth-child(1) > div.flex.gap-4.mb-2\.5.items-start > span > span";

/// goudengids.nl: full listings on the HTML search page.
pub struct Nicaragua;

fn parse_item(item: ElementRef<'_>) -> Result<Record> {
    let street = html::first_text(item, "span[data-yext='street']")?;
    let postal_code = html::first_text(item, "span[data-yext='postal-code']")?;
    let city = html::first_text(item, "span[data-yext='city']")?;

    Ok(Record {
        name: html::first_text(item, "h2[itemprop='name']")?,
        categories: join_unique(html::all_text(item, CATEGORY_SELECTOR)?),
        phone: html::first_attr(item, "div[data-js-event='call']", "data-js-value")?,
        email: html::first_attr(item, "div[data-js-event='email']", "data-js-value")?,
        region: [street.as_str(), postal_code.as_str(), city.as_str()].join(", "),
        address: street,
        city,
        postal_code,
    })
}

impl Source for Nicaragua {
    fn id(&self) -> &'static str {
        "nicaragua"
    }

    fn display_name(&self) -> &'static str {
        "Nicaragua"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Listing
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        FetchRequest::get(format!(
            "https://www.goudengids.nl/nl/zoeken/{}/{}/{}",
            urlencoding::encode(&ctx.keyword),
            urlencoding::encode(&ctx.location),
            page
        ))
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let doc = html::document(body);
        let root = doc.root_element();

        let records = html::select(root, "ol.result-items > li.result-item")?
            .into_iter()
            .map(parse_item)
            .collect::<Result<Vec<_>>>()?;
        let total = html::digits(&html::first_text(root, "span.count")?).unwrap_or(0);

        Ok(SearchPage {
            records,
            previews: Vec::new(),
            page_count: page_count(total, PAGE_SIZE),
        })
    }
}
