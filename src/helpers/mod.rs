//! Helper functions available to every render
//!
//! The bundle is passed explicitly into the render context so that
//! components can build anchors, look up collection items and format dates.

mod date;
mod html;
mod url;

use chrono::{DateTime, Utc};

pub use date::*;
pub use html::*;
pub use url::*;

use crate::config::SiteMetadata;
use crate::content::Page;
use crate::navigation::{self, LookupError};

/// Collection of all helper functions
#[derive(Debug, Clone)]
pub struct Helpers {
    base_url: String,
}

impl Helpers {
    /// Create a new helpers instance
    pub fn new(metadata: &SiteMetadata) -> Self {
        Self {
            base_url: metadata.url.clone(),
        }
    }

    /// Slug-form identifier for a piece of text
    pub fn slug(&self, text: &str) -> String {
        slug::slugify(text)
    }

    /// The collection item representing `page`
    pub fn get_collection_item<'c>(&self, collection: &'c [Page], page: &Page) -> Option<&'c Page> {
        collection.iter().find(|p| p.url == page.url)
    }

    /// The item before `page` in `collection`
    pub fn get_previous_collection_item<'c>(
        &self,
        collection: &'c [Page],
        page: &Page,
    ) -> Result<Option<&'c Page>, LookupError> {
        navigation::previous(collection, page)
    }

    /// The item after `page` in `collection`
    pub fn get_next_collection_item<'c>(
        &self,
        collection: &'c [Page],
        page: &Page,
    ) -> Result<Option<&'c Page>, LookupError> {
        navigation::next(collection, page)
    }

    /// Absolute URL of a site path
    pub fn absolute_url(&self, path: &str) -> String {
        absolute_url(&self.base_url, path)
    }

    /// `YYYY-MM-DD`, see the HTML valid date string
    pub fn html_date_string(&self, date: &DateTime<Utc>) -> String {
        html_date_string(date)
    }

    /// `dd Mon yyyy`
    pub fn readable_date(&self, date: &DateTime<Utc>) -> String {
        readable_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_bundle() {
        let helpers = Helpers::new(&SiteMetadata {
            url: "https://example.com/".to_string(),
            ..Default::default()
        });
        assert_eq!(helpers.slug("Hello, World!"), "hello-world");
        assert_eq!(helpers.absolute_url("/about/"), "https://example.com/about/");

        let posts = vec![Page::new("/a/", ""), Page::new("/b/", "")];
        let found = helpers.get_collection_item(&posts, &Page::new("/b/", "other body"));
        assert_eq!(found.map(|p| p.url.as_str()), Some("/b/"));
        assert!(helpers
            .get_collection_item(&posts, &Page::new("/c/", ""))
            .is_none());

        let next = helpers.get_next_collection_item(&posts, &posts[0]).unwrap();
        assert_eq!(next.map(|p| p.url.as_str()), Some("/b/"));
        assert!(helpers
            .get_previous_collection_item(&posts, &Page::new("/c/", ""))
            .is_err());
    }
}
