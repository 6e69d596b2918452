//! CSS-selector helpers over `scraper`.
//!
//! All lookups return trimmed strings and use an empty string for "not found".

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::app::{HarvestError, Result};

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| HarvestError::Selector(format!("{css}: {e}")))
}

pub fn document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Matches of `css` inside `scope`.
pub fn select<'a>(scope: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(scope.select(&selector).collect())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first match.
pub fn first_text(scope: ElementRef<'_>, css: &str) -> Result<String> {
    Ok(select(scope, css)?
        .into_iter()
        .next()
        .map(element_text)
        .unwrap_or_default())
}

/// Attribute of the first match.
pub fn first_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Result<String> {
    Ok(select(scope, css)?
        .into_iter()
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default())
}

/// Text of every match.
pub fn all_text(scope: ElementRef<'_>, css: &str) -> Result<Vec<String>> {
    Ok(select(scope, css)?.into_iter().map(element_text).collect())
}

/// Attribute of every match that has it.
pub fn all_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> Result<Vec<String>> {
    Ok(select(scope, css)?
        .into_iter()
        .filter_map(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .collect())
}

/// Direct text children of every match, skipping nested elements.
pub fn own_text(scope: ElementRef<'_>, css: &str) -> Result<Vec<String>> {
    Ok(select(scope, css)?
        .into_iter()
        .flat_map(|el| {
            el.children()
                .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
                .collect::<Vec<_>>()
        })
        .filter(|text| !text.is_empty())
        .collect())
}

/// Serialized markup of every match joined with a space.
pub fn outer_html(scope: ElementRef<'_>, css: &str) -> Result<String> {
    Ok(select(scope, css)?
        .into_iter()
        .map(|el| el.html())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Resolve `href` against `base`; empty for an empty or unusable href.
pub fn absolute_url(base: &str, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_default()
}

/// First integer captured by an "of N" phrase in any of `texts`.
pub fn total_from_of_phrase(texts: &[String]) -> Option<u64> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r"of (\d+)").expect("valid pattern"));
    texts
        .iter()
        .find_map(|text| pattern.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse a count that may contain spaces or thousands separators ("1 234").
pub fn digits(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

pub fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> &'a str {
    match value.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &value[prefix.len()..],
        _ => value,
    }
}
