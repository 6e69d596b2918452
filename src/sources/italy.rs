use serde_json::Value;

use crate::app::Result;
use crate::domain::Record;
use crate::fetcher::FetchRequest;
use crate::sources::{json, join_unique, SearchContext, SearchPage, Source, SourceModel};

const PAGE_SIZE: u32 = 20;

/// paginegialle.it: the search page answers with JSON when asked for it.
pub struct Italy;

fn parse_result(result: &Value) -> Record {
    Record {
        name: json::str_at(result, "/ds_ragsoc"),
        categories: json::str_at(result, "/ds_cat"),
        phone: join_unique(json::strings_at(result, "/ds_ls_telefoni")),
        email: join_unique(json::strings_at(result, "/ds_ls_email")),
        address: json::str_at(result, "/addr"),
        city: json::str_at(result, "/loc"),
        region: json::str_at(result, "/reg"),
        postal_code: json::str_at(result, "/ds_cap"),
    }
}

impl Source for Italy {
    fn id(&self) -> &'static str {
        "italy"
    }

    fn display_name(&self) -> &'static str {
        "Italy"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Listing
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        FetchRequest::get(format!(
            "https://www.paginegialle.it/ricerca/{}/{}/p-{}?output=json",
            urlencoding::encode(&ctx.keyword),
            urlencoding::encode(&ctx.location),
            page
        ))
    }

    /// The site reports its page count directly.
    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let value = json::parse(body)?;

        let records = json::array_at(&value, "/list/out/base/results")
            .iter()
            .map(parse_result)
            .collect();
        let pages = json::u64_at(&value, "/list/pagination/numPages").unwrap_or(1);

        Ok(SearchPage {
            records,
            previews: Vec::new(),
            page_count: u32::try_from(pages).unwrap_or(u32::MAX).max(1),
        })
    }
}
