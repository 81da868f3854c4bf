//! The site catalog: categories of bookmarked sites, read from and written
//! back to YAML.
//!
//! ```yaml
//! index:
//!   - category: Search
//!     links:
//!       - title: Google
//!         url: https://www.google.com/search
//!         favicon: img/www.google.com.png
//!         searchwords: Google   www.google.com
//!         datauriclass: wwwgooglecom
//!         faviconclass: wwwgooglecom
//! ```
//!
//! The shape is preserved on write: `favicon` and `searchwords` are always
//! emitted (empty when unset), the two class fields only when present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write catalog {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid catalog {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// A bookmarked site. Identity is its position in the category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub title: String,
    pub url: String,
    /// Icon reference relative to the content directory, e.g.
    /// `img/www.google.com.png`.
    #[serde(default, with = "empty_as_none")]
    pub favicon: Option<String>,
    #[serde(default, rename = "searchwords")]
    pub search_words: String,
    #[serde(
        default,
        rename = "datauriclass",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_uri_class: Option<String>,
    #[serde(
        default,
        rename = "faviconclass",
        skip_serializing_if = "Option::is_none"
    )]
    pub favicon_class: Option<String>,
}

impl Site {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category")]
    pub name: String,
    #[serde(default, rename = "links")]
    pub sites: Vec<Site>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "index")]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, CatalogError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of sites across all categories.
    pub fn total_sites(&self) -> usize {
        self.categories.iter().map(|c| c.sites.len()).sum()
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.categories.iter().flat_map(|c| c.sites.iter())
    }
}

/// `Option<String>` stored as a plain string, empty meaning `None`.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value: Option<String> = Option::deserialize(d)?;
        Ok(value.filter(|s| !s.trim().is_empty()))
    }
}
