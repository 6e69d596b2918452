use crate::app::Result;
use crate::domain::{Preview, Record};
use crate::fetcher::FetchRequest;
use crate::sources::{html, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const BASE_URL: &str = "https://www.goldenpages.ie/";
const PAGE_SIZE: u32 = 20;

/// goldenpages.ie: HTML search results linking to HTML detail pages.
pub struct Ireland;

/// Split "12 Main St Dublin D02 X285 Co. Dublin" into street, city, county
/// and Eircode. Addresses without a county are left unparsed.
fn parse_address(address: &str) -> (String, String, String, String) {
    let Some((front, county)) = address.split_once(" Co. ") else {
        return Default::default();
    };
    let county = county.trim();
    if county.is_empty() {
        return Default::default();
    }

    let mut tail: Vec<&str> = front.trim().rsplitn(4, ' ').collect();
    tail.reverse();
    let (street, city, postal_code) = match tail.as_slice() {
        [street, city, a, b] => (street.to_string(), city.to_string(), format!("{a} {b}")),
        [city, a, b] => (String::new(), city.to_string(), format!("{a} {b}")),
        [city, code] => (String::new(), city.to_string(), code.to_string()),
        [city] => (String::new(), city.to_string(), String::new()),
        _ => Default::default(),
    };

    (street, city, county.to_string(), postal_code)
}

impl Source for Ireland {
    fn id(&self) -> &'static str {
        "ireland"
    }

    fn display_name(&self) -> &'static str {
        "Ireland"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Detail
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        FetchRequest::get(format!(
            "https://www.goldenpages.ie/q/business/advanced/where/{}/what/{}/{}",
            urlencoding::encode(&ctx.location),
            urlencoding::encode(&ctx.keyword),
            page
        ))
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let doc = html::document(body);
        let root = doc.root_element();

        let mut previews = Vec::new();
        for listing in html::select(root, "div.listing_container")? {
            let href = html::first_attr(listing, "a.listing_title_link", "href")?;
            let url = html::absolute_url(BASE_URL, &href);
            if !url.is_empty() {
                previews.push(Preview::new(url));
            }
        }

        let counters = html::all_text(root, "div#page_helper > div")?;
        let total = html::total_from_of_phrase(&counters).unwrap_or(0);

        Ok(SearchPage {
            records: Vec::new(),
            previews,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    fn parse_detail_page(&self, body: &str) -> Result<Record> {
        let doc = html::document(body);
        let root = doc.root_element();

        let (address, city, region, postal_code) =
            parse_address(&html::first_text(root, "p.company_address")?);

        Ok(Record {
            name: html::first_text(root, "h1.company_name > span:first-child")?,
            categories: join_unique(html::all_text(root, "div.tag_cloud a")?),
            phone: html::first_text(root, "a[href^='tel:']")?,
            email: html::first_text(root, "a[href^='mailto:']")?,
            address,
            city,
            region,
            postal_code,
        })
    }
}
