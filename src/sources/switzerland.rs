use serde_json::{json, Value};

use crate::app::Result;
use crate::domain::Record;
use crate::fetcher::FetchRequest;
use crate::sources::{json, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const GRAPHQL_URL: &str = "https://www.local.ch/api/graphql";
const PAGE_SIZE: u32 = 25;

const SEARCH_QUERY: &str = "query search($what:String$where:String$q:String$pagination:PaginationInformation!$debugMode:Boolean=true){search(options:{what:$what,where:$where,q:$q,debugMode:$debugMode}pagination:$pagination){total totalBusinesses entries{entry{entryType title address{streetLine zipCode city cantonCode}contacts{value __typename}categories{all{name{en}}}}}}}";

/// local.ch: GraphQL search returning full business entries.
pub struct Switzerland;

/// Contact values of one GraphQL type ("PhoneContact", "EmailContact").
fn contacts(entry: &Value, typename: &str) -> Vec<String> {
    json::array_at(entry, "/contacts")
        .iter()
        .filter(|contact| json::str_at(contact, "/__typename") == typename)
        .map(|contact| json::str_at(contact, "/value"))
        .collect()
}

fn parse_entry(entry: &Value) -> Record {
    Record {
        name: json::str_at(entry, "/title"),
        categories: join_unique(json::field_of_each(entry, "/categories/all", "/name/en")),
        phone: join_unique(contacts(entry, "PhoneContact")),
        email: join_unique(contacts(entry, "EmailContact")),
        address: json::str_at(entry, "/address/streetLine"),
        city: json::str_at(entry, "/address/city"),
        region: json::str_at(entry, "/address/cantonCode"),
        postal_code: json::str_at(entry, "/address/zipCode"),
    }
}

impl Source for Switzerland {
    fn id(&self) -> &'static str {
        "switzerland"
    }

    fn display_name(&self) -> &'static str {
        "Switzerland"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Listing
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        let body = json!({
            "operationName": "search",
            "variables": {
                "debugMode": true,
                "what": ctx.keyword,
                "where": ctx.location,
                "pagination": {
                    "start": page.saturating_sub(1).saturating_mul(PAGE_SIZE),
                    "limit": PAGE_SIZE,
                },
                "q": "",
            },
            "query": SEARCH_QUERY,
        });
        FetchRequest::post_json(GRAPHQL_URL, body)
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let value = json::parse(body)?;

        let records = json::array_at(&value, "/data/search/entries")
            .iter()
            .filter_map(|item| item.get("entry"))
            .filter(|entry| json::str_at(entry, "/entryType") == "BUSINESS")
            .map(parse_entry)
            .collect();
        let total = json::u64_at(&value, "/data/search/total").unwrap_or(0);

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
    use crate::fetcher::Method;

    #[test]
    fn test_search_request() {
        let ctx = SearchContext {
            keyword: "bäckerei".into(),
            location: "Zürich".into(),
            token: None,
        };
        let request = Switzerland.search_request(&ctx, 2);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, GRAPHQL_URL);

        let body = request.json.unwrap();
        assert_eq!(body["operationName"], "search");
        assert_eq!(body["variables"]["where"], "Zürich");
        assert_eq!(body["variables"]["pagination"]["start"], 25);
        assert_eq!(body["variables"]["pagination"]["limit"], 25);
        assert_eq!(body["query"], SEARCH_QUERY);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let ctx = SearchContext {
            keyword: "bäckerei".into(),
            location: "Zürich".into(),
            token: None,
        };
        let body = Switzerland.search_request(&ctx, u32::MAX).json.unwrap();
        assert_eq!(body["variables"]["pagination"]["start"], u32::MAX);
    }

    #[test]
    fn test_parse_search_page_keeps_businesses() {
        let body = r#"{"data": {"search": {
          "total": 26,
          "entries": [
            {"entry": {
              "entryType": "BUSINESS",
              "title": "Bäckerei Huber",
              "address": {"streetLine": "Bahnhofstrasse 1", "zipCode": "8001", "city": "Zürich", "cantonCode": "ZH"},
              "contacts": [
                {"value": "+41 44 123 45 67", "__typename": "PhoneContact"},
                {"value": "info@huber.example", "__typename": "EmailContact"},
                {"value": "https://huber.example", "__typename": "URLContact"}
              ],
              "categories": {"all": [{"name": {"en": "Bakery"}}, {"name": {"en": "Confectionery"}}]}
            }},
            {"entry": {"entryType": "PERSON", "title": "Hans Huber"}}
          ]
        }}}"#;
        let page = Switzerland.parse_search_page(body).unwrap();
        assert_eq!(page.page_count, 2);
        assert_eq!(
            page.records,
            vec![Record {
                name: "Bäckerei Huber".into(),
                categories: "Bakery, Confectionery".into(),
                phone: "+41 44 123 45 67".into(),
                email: "info@huber.example".into(),
                address: "Bahnhofstrasse 1".into(),
                city: "Zürich".into(),
                region: "ZH".into(),
                postal_code: "8001".into(),
            }]
        );
    }
}
