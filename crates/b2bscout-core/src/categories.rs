//! Category files: a mapping of category name to listing start URL.
//!
//! Accepted as JSON (`{"pumps": "https://..."}`) or YAML (`pumps: https://...`).
//! Entry order from the file is preserved, since categories are crawled in
//! the order they are listed.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::ConfigError;

/// One unit of crawl work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub start_url: String,
}

/// Ordered list of categories loaded from a categories file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories(pub Vec<Category>);

impl Categories {
    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of category name to start URL")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, start_url)) = map.next_entry::<String, String>()? {
                    out.push(Category { name, start_url });
                }
                Ok(Categories(out))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

/// Serialization format of a categories file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFormat {
    Json,
    Yaml,
}

impl CategoryFormat {
    /// Picks the format from the file extension; anything that is not
    /// `.yaml`/`.yml` is read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => CategoryFormat::Yaml,
            _ => CategoryFormat::Json,
        }
    }
}

/// Load and validate a categories file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<Categories, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_categories(&content, CategoryFormat::from_path(path))
}

/// Parse and validate categories from an in-memory document.
///
/// # Errors
///
/// Returns `ConfigError::CategoriesFileParse` on malformed input and
/// `ConfigError::Validation` on empty names, duplicate names, or start URLs
/// that are not absolute `http`/`https` URLs.
pub fn parse_categories(content: &str, format: CategoryFormat) -> Result<Categories, ConfigError> {
    let categories: Categories = match format {
        CategoryFormat::Json => serde_json::from_str(content)
            .map_err(|e| ConfigError::CategoriesFileParse(e.to_string()))?,
        CategoryFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| ConfigError::CategoriesFileParse(e.to_string()))?,
    };

    validate_categories(&categories)?;
    Ok(categories)
}

fn validate_categories(categories: &Categories) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for category in categories {
        if category.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name must be non-empty".to_string(),
            ));
        }

        if !seen.insert(category.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }

        let url = category.start_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "category '{}' has start URL '{}'; expected an absolute http(s) URL",
                category.name, category.start_url
            )));
        }
    }

    Ok(())
}
