use serde_json::Value;
use url::Url;

use crate::app::Result;
use crate::domain::Record;
use crate::fetcher::FetchRequest;
use crate::sources::{json, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const PAGE_SIZE: u32 = 10;

/// yep.co.za: JSON storefront search.
pub struct SouthAfrica;

fn parse_storefront(item: &Value) -> Record {
    Record {
        name: json::str_at(item, "/name"),
        categories: join_unique(json::strings_at(item, "/category")),
        phone: String::new(),
        email: json::str_at(item, "/email"),
        address: json::str_at(item, "/address/address1"),
        city: json::str_at(item, "/address/city"),
        region: json::str_at(item, "/address/province"),
        postal_code: json::str_at(item, "/address/postcode"),
    }
}

impl Source for SouthAfrica {
    fn id(&self) -> &'static str {
        "south_africa"
    }

    fn display_name(&self) -> &'static str {
        "South Africa"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Listing
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        let from = page.saturating_sub(1).saturating_mul(PAGE_SIZE).to_string();
        let url = Url::parse_with_params(
            "https://api.yep.co.za/search",
            &[
                ("what", ctx.keyword.as_str()),
                ("where", ctx.location.as_str()),
                ("from", from.as_str()),
                ("type", "storefronts"),
            ],
        )
        .map(String::from)
        .unwrap_or_default();
        FetchRequest::get(url)
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let value = json::parse(body)?;

        let records = json::array_at(&value, "/data")
            .iter()
            .map(parse_storefront)
            .collect();
        let total = json::u64_at(&value, "/total").unwrap_or(0);

        Ok(SearchPage {
            records,
            previews: Vec::new(),
            page_count: page_count(total, PAGE_SIZE),
        })
    }
}
