use serde_json::json;

use crate::app::Result;
use crate::domain::{Preview, Record};
use crate::fetcher::FetchRequest;
use crate::sources::{json, join_unique, page_count, SearchContext, SearchPage, Source, SourceModel};

const SEARCH_URL: &str = "https://services.411.ca/search-business/";
const PAGE_SIZE: u32 = 25;
const DEFAULT_CITY: u32 = 23603;

/// Location names the site accepts and their city dimension ids.
const LOCATIONS: &[(&str, u32)] = &[
    ("Toronto", 23603),
    ("Mississauga", 15074),
    ("North York", 16385),
    ("Scarborough", 21323),
    ("Markham", 14134),
    ("Brampton", 2480),
    ("Etobicoke", 6859),
    ("Richmond Hill", 18986),
    ("Oakville", 16611),
    ("Thornhill", 23437),
    ("Woodbridge", 25665),
    ("Vaughan", 24363),
    ("Pickering", 17530),
    ("York", 25833),
    ("Ajax", 141),
    ("Concord", 4675),
    ("East York", 6385),
    ("Unionville", 23975),
    ("Maple", 13999),
    ("Bolton", 2242),
    ("Stouffville", 22771),
    ("King City", 11062),
    ("Kleinburg", 11239),
    ("Streetsville", 22819),
    ("Ottawa", 16881),
    ("Gormley", 8402),
    ("Locust Hill", 13256),
    ("Whitchurch Stouffville", 25289),
    ("Cooksville", 4738),
    ("Downsview", 5930),
    ("Aurora", 779),
    ("Hornby", 9873),
    ("Montreal, QC", 15240),
    ("Nobel", 16131),
    ("Nobleton", 16135),
    ("Oakwood", 16612),
    ("Pickering Beach", 17531),
    ("Port Credit", 18094),
    ("Vancouver, BC", 24315),
    ("Caledon East", 3150),
    ("Calgary, AB", 3159),
    ("Clarkson", 4338),
    ("Edmonton, AB", 6493),
    ("Golden, BC", 8319),
    ("Haliburton", 8995),
    ("Coffee Shops", 2512),
    ("Restaurants", 827),
    ("Unknown", 20014),
    ("Bakeries", 2536),
    ("Bars", 2468),
    ("Catering", 2520),
    ("Coffee Roasting", 1677),
    ("Delicatessens", 2544),
    ("Internet Cafes", 696),
    ("Café", 12632),
    ("Grocery Stores", 2510),
    ("Coffee", 2603),
    ("Italian Restaurants", 2630),
    ("Ice Cream", 2704),
    ("Beverage Supplies", 1753),
    ("Bistro", 2574),
    ("Pizza", 6324),
    ("Franchising", 1121),
    ("Tea", 3302),
    ("Donuts", 2572),
    ("Sandwiches", 2678),
    ("Bagels", 2712),
    ("Pastries", 2581),
];

/// Unknown names fall back to Toronto.
fn city_id(location: &str) -> u32 {
    LOCATIONS
        .iter()
        .find(|(name, _)| *name == location)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_CITY)
}

/// 411.ca: JSON search API returning merchant ids, one JSON detail per merchant.
pub struct Canada;

impl Source for Canada {
    fn id(&self) -> &'static str {
        "canada"
    }

    fn display_name(&self) -> &'static str {
        "Canada"
    }

    fn model(&self) -> SourceModel {
        SourceModel::Detail
    }

    fn page_size(&self) -> u32 {
        PAGE_SIZE
    }

    fn locations(&self) -> Option<Vec<&'static str>> {
        Some(LOCATIONS.iter().map(|(name, _)| *name).collect())
    }

    fn search_request(&self, ctx: &SearchContext, page: u32) -> FetchRequest {
        let body = json!({
            "search": [{
                "collection": "MERCHANT",
                "language": "EN",
                "query": ctx.keyword,
                "randomSeed": 4178732771847u64,
                "userLocation": {
                    "approximateLocation": "43.755091,-79.347743",
                },
                "results": [{
                    "type": "ROOT",
                    "from": PAGE_SIZE.saturating_mul(page.saturating_sub(1)),
                    "count": PAGE_SIZE,
                    "sort": "411_advertiser",
                }],
                "dimension": format!("(city = {})", city_id(&ctx.location)),
            }],
        });

        FetchRequest::post_json(SEARCH_URL, body)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json, text/plain, */*")
    }

    fn parse_search_page(&self, body: &str) -> Result<SearchPage> {
        let value = json::parse(body)?;

        let previews = json::field_of_each(&value, "/searchResult/0/merchants", "/merchantId")
            .into_iter()
            .filter(|id| !id.is_empty())
            .map(|id| {
                Preview::named(
                    id.clone(),
                    format!("https://services.411.ca/business/{id}?lang=EN"),
                )
            })
            .collect();

        let total = json::u64_at(&value, "/searchResult/0/summary/pagination/numFound").unwrap_or(0);

        Ok(SearchPage {
            records: Vec::new(),
            previews,
            page_count: page_count(total, PAGE_SIZE),
        })
    }

    fn parse_detail_page(&self, body: &str) -> Result<Record> {
        let value = json::parse(body)?;

        Ok(Record {
            name: json::str_at(&value, "/data/name"),
            categories: join_unique(json::field_of_each(&value, "/data/categories", "/name")),
            phone: join_unique(json::field_of_each(&value, "/data/phone", "/value")),
            email: json::str_at(&value, "/data/email/address"),
            address: json::str_at(&value, "/data/address/addressLine1"),
            city: json::str_at(&value, "/data/address/city/name"),
            region: json::str_at(&value, "/data/address/city/province/name"),
            postal_code: json::str_at(&value, "/data/address/postalcode"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::Method;

    fn ctx(location: &str) -> SearchContext {
        SearchContext {
            keyword: "coffee".into(),
            location: location.into(),
            token: None,
        }
    }

    #[test]
    fn test_locations_keep_table_order() {
        let locations = Canada.locations().unwrap();
        assert_eq!(locations.len(), LOCATIONS.len());
        assert_eq!(locations[0], "Toronto");
        assert_eq!(locations[32], "Montreal, QC");
        assert_eq!(*locations.last().unwrap(), "Pastries");
    }

    #[test]
    fn test_city_id_defaults_to_toronto() {
        assert_eq!(city_id("Ottawa"), 16881);
        assert_eq!(city_id("Atlantis"), 23603);
    }

    #[test]
    fn test_search_request_body() {
        let request = Canada.search_request(&ctx("Ottawa"), 3);
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, SEARCH_URL);

        let body = request.json.unwrap();
        assert_eq!(body["search"][0]["query"], "coffee");
        assert_eq!(body["search"][0]["results"][0]["from"], 50);
        assert_eq!(body["search"][0]["results"][0]["count"], 25);
        assert_eq!(body["search"][0]["dimension"], "(city = 16881)");
        assert!(request
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let request = Canada.search_request(&ctx("Ottawa"), u32::MAX);
        let body = request.json.unwrap();
        assert_eq!(body["search"][0]["results"][0]["from"], u32::MAX);
    }

    #[test]
    fn test_parse_search_page() {
        let body = r#"{
          "searchResult": [{
            "merchants": [{"merchantId": "1001"}, {"merchantId": 1002}, {"other": 1}],
            "summary": {"pagination": {"numFound": 51}}
          }]
        }"#;
        let page = Canada.parse_search_page(body).unwrap();
        let urls: Vec<_> = page.previews.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://services.411.ca/business/1001?lang=EN",
                "https://services.411.ca/business/1002?lang=EN",
            ]
        );
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_parse_detail_page() {
        let body = r#"{
          "data": {
            "name": "Bean There",
            "categories": [{"name": "Coffee Shops"}, {"name": "Cafes"}],
            "phone": [{"value": "613-555-0100"}, {"value": "613-555-0100"}],
            "email": {"address": "hi@bean.example"},
            "address": {
              "addressLine1": "1 Bank St",
              "postalcode": "K1P 5N2",
              "city": {"name": "Ottawa", "province": {"name": "Ontario"}}
            }
          }
        }"#;
        let record = Canada.parse_detail_page(body).unwrap();
        assert_eq!(
            record,
            Record {
                name: "Bean There".into(),
                categories: "Coffee Shops, Cafes".into(),
                phone: "613-555-0100".into(),
                email: "hi@bean.example".into(),
                address: "1 Bank St".into(),
                city: "Ottawa".into(),
                region: "Ontario".into(),
                postal_code: "K1P 5N2".into(),
            }
        );
    }

    #[test]
    fn test_detail_page_must_be_json() {
        assert!(Canada.parse_detail_page("<html>").is_err());
    }
}
