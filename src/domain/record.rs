use serde::{Deserialize, Serialize};

/// A normalized business listing.
///
/// Every field is a plain string; a missing value is an empty string so that
/// exported rows stay uniform. A record without a name is not a valid result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub categories: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Reference to a detail page discovered on a search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: Option<String>,
    pub url: String,
}

impl Preview {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: None,
            url: url.into(),
        }
    }

    pub fn named(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: url.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}
