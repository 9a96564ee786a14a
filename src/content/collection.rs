//! Named page collections

use std::collections::HashSet;
use thiserror::Error;

use super::Page;
use crate::navigation::{self, NavEntry};

/// Tag that places a page in the `posts` collection
pub const POSTS_TAG: &str = "posts";

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Duplicate url {url}: {first} and {second}")]
    DuplicateUrl {
        url: String,
        first: String,
        second: String,
    },
}

/// The collections every render can see
#[derive(Debug, Clone, Default)]
pub struct Collections {
    /// Every page that is not excluded from collections
    pub all: Vec<Page>,
    /// Pages tagged `posts`, oldest first
    pub posts: Vec<Page>,
    /// Navigation entries, in collection order
    pub nav: Vec<NavEntry>,
}

impl Collections {
    /// Partition pages into collections, rejecting duplicate urls
    pub fn build(pages: &[Page]) -> Result<Self, CollectionError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for page in pages {
            if !seen.insert(page.url.as_str()) {
                let first = pages
                    .iter()
                    .find(|p| p.url == page.url)
                    .map(|p| p.input_path.display().to_string())
                    .unwrap_or_default();
                return Err(CollectionError::DuplicateUrl {
                    url: page.url.clone(),
                    first,
                    second: page.input_path.display().to_string(),
                });
            }
        }

        let all: Vec<Page> = pages
            .iter()
            .filter(|p| !p.exclude_from_collections)
            .cloned()
            .collect();

        let mut posts: Vec<Page> = all
            .iter()
            .filter(|p| p.tags.iter().any(|t| t == POSTS_TAG))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.input_path.cmp(&b.input_path))
        });

        let nav = navigation::collect_entries(&all);

        tracing::debug!(
            "Built collections: {} pages, {} posts, {} nav entries",
            all.len(),
            posts.len(),
            nav.len()
        );

        Ok(Self { all, posts, nav })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_posts_sorted_by_date() {
        let pages = vec![
            Page::new("/b/", "")
                .with_tags(["posts"])
                .with_date(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            Page::new("/about/", ""),
            Page::new("/a/", "")
                .with_tags(["posts"])
                .with_date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        ];
        let collections = Collections::build(&pages).unwrap();
        assert_eq!(collections.all.len(), 3);
        let urls: Vec<_> = collections.posts.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/a/", "/b/"]);
    }

    #[test]
    fn test_excluded_pages_are_not_collected() {
        let mut sitemap = Page::new("/sitemap.xml", "").with_nav("Sitemap", 9.0);
        sitemap.exclude_from_collections = true;
        let pages = vec![Page::new("/", "").with_nav("Home", 0.0), sitemap];
        let collections = Collections::build(&pages).unwrap();
        assert_eq!(collections.all.len(), 1);
        assert_eq!(collections.nav.len(), 1);
    }

    #[test]
    fn test_duplicate_urls_rejected() {
        let pages = vec![Page::new("/x/", "one"), Page::new("/x/", "two")];
        let err = Collections::build(&pages).unwrap_err();
        assert!(err.to_string().contains("/x/"));
    }
}
