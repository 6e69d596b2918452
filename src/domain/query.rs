use crate::app::{HarvestError, Result};

/// A single (keyword, location) search submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub keyword: String,
    pub location: String,
}

impl Query {
    pub fn new(keyword: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
        }
    }

    /// Pair up comma-separated keywords and locations.
    ///
    /// Both lists must have the same number of entries.
    pub fn pair_lists(keywords: &str, locations: &str) -> Result<Vec<Query>> {
        pair(split_list(keywords), split_list(locations))
    }

    /// Like [`Query::pair_lists`], but adjacent location pieces that together
    /// form one of `known` ("Montreal, QC") count as a single location.
    pub fn pair_with_known(
        keywords: &str,
        locations: &str,
        known: &[&str],
    ) -> Result<Vec<Query>> {
        let pieces = split_list(locations);
        let mut merged = Vec::with_capacity(pieces.len());
        let mut i = 0;
        while i < pieces.len() {
            if let Some(next) = pieces.get(i + 1) {
                let joined = format!("{}, {}", pieces[i], next);
                if known.iter().any(|name| *name == joined) {
                    merged.push(joined);
                    i += 2;
                    continue;
                }
            }
            merged.push(pieces[i].to_string());
            i += 1;
        }

        pair(
            split_list(keywords),
            merged.iter().map(String::as_str).collect(),
        )
    }
}

fn pair(keywords: Vec<&str>, locations: Vec<&str>) -> Result<Vec<Query>> {
    if keywords.len() != locations.len() {
        return Err(HarvestError::QueryMismatch {
            keywords: keywords.len(),
            locations: locations.len(),
        });
    }

    Ok(keywords
        .into_iter()
        .zip(locations)
        .map(|(keyword, location)| Query::new(keyword, location))
        .collect())
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' in '{}'", self.keyword, self.location)
    }
}

fn split_list(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
