//! Page model

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Page "type" tag, selecting the content wrapper in the page shell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Plain,
    Post,
    Jumbotron,
}

/// Navigation opt-in flag (`mdxNav` in front-matter)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavOptIn {
    /// Display key; defaults to the page title
    pub key: Option<String>,
    pub order: f64,
}

/// One content document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Output URL, unique across the site
    pub url: String,

    /// Source file path
    pub input_path: PathBuf,

    pub title: Option<String>,

    pub description: Option<String>,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Raw markup before the excerpt separator
    pub excerpt: Option<String>,

    pub page_type: PageType,

    /// Raw markup body
    pub body: String,

    /// Explicit permalink from front-matter
    pub permalink: Option<String>,

    pub nav: Option<NavOptIn>,

    pub tags: Vec<String>,

    /// Rendered but kept out of every collection
    pub exclude_from_collections: bool,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            input_path: PathBuf::new(),
            title: None,
            description: None,
            date: DateTime::<Utc>::UNIX_EPOCH,
            excerpt: None,
            page_type: PageType::Plain,
            body: body.into(),
            permalink: None,
            nav: None,
            tags: Vec::new(),
            exclude_from_collections: false,
            extra: IndexMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_type(mut self, page_type: PageType) -> Self {
        self.page_type = page_type;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nav(mut self, key: impl Into<String>, order: f64) -> Self {
        self.nav = Some(NavOptIn {
            key: Some(key.into()),
            order,
        });
        self
    }

    /// True when the body is the page's own permalink, i.e. a pass-through page
    pub fn is_permalink_sentinel(&self) -> bool {
        self.permalink.as_deref() == Some(self.body.as_str())
    }

    /// Title used by links pointing at this page
    pub fn link_text(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permalink_sentinel() {
        let mut page = Page::new("/robots.txt", "/robots.txt");
        assert!(!page.is_permalink_sentinel());
        page.permalink = Some("/robots.txt".to_string());
        assert!(page.is_permalink_sentinel());
        page.body = "User-agent: *".to_string();
        assert!(!page.is_permalink_sentinel());
    }

    #[test]
    fn test_page_type_names() {
        let ty: PageType = serde_yaml::from_str("jumbotron").unwrap();
        assert_eq!(ty, PageType::Jumbotron);
        assert_eq!(PageType::default(), PageType::Plain);
    }
}
