//! Navigation derived from the page collections
//!
//! The navigation bar lists every page that opts in through `mdxNav`
//! front-matter, ordered by its numeric `order`. Posts link to their
//! neighbours in the `posts` collection.

use serde::Serialize;
use thiserror::Error;

use crate::content::Page;

#[derive(Error, Debug, PartialEq)]
pub enum LookupError {
    #[error("Page {0} is not part of the collection")]
    NotInCollection(String),
}

/// A page projected into the navigation bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub key: String,
    pub order: f64,
    pub url: String,
}

/// A navigation entry as seen from the page being rendered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavItem<'a> {
    pub entry: &'a NavEntry,
    pub active: bool,
}

/// Direction of a neighbour lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Project every opted-in page into a navigation entry, in collection order
pub fn collect_entries(pages: &[Page]) -> Vec<NavEntry> {
    pages
        .iter()
        .filter_map(|page| {
            let nav = page.nav.as_ref()?;
            let key = nav
                .key
                .clone()
                .unwrap_or_else(|| page.link_text().to_string());
            Some(NavEntry {
                key,
                order: nav.order,
                url: page.url.clone(),
            })
        })
        .collect()
}

/// Navigation list for the page at `current_url`, ascending by `order`
pub fn nav_list<'a>(entries: &'a [NavEntry], current_url: &str) -> Vec<NavItem<'a>> {
    let mut items: Vec<NavItem<'a>> = entries
        .iter()
        .map(|entry| NavItem {
            entry,
            active: entry.url == current_url,
        })
        .collect();
    // Stable sort: equal orders keep collection order
    items.sort_by(|a, b| a.entry.order.total_cmp(&b.entry.order));
    items
}

/// Neighbour of `page` within an ordered collection
pub fn adjacent<'c>(
    collection: &'c [Page],
    page: &Page,
    direction: Direction,
) -> Result<Option<&'c Page>, LookupError> {
    let pos = collection
        .iter()
        .position(|p| p.url == page.url)
        .ok_or_else(|| LookupError::NotInCollection(page.url.clone()))?;

    let neighbour = match direction {
        Direction::Previous => pos.checked_sub(1).and_then(|i| collection.get(i)),
        Direction::Next => collection.get(pos + 1),
    };
    Ok(neighbour)
}

/// Page before `page` in `collection`
pub fn previous<'c>(collection: &'c [Page], page: &Page) -> Result<Option<&'c Page>, LookupError> {
    adjacent(collection, page, Direction::Previous)
}

/// Page after `page` in `collection`
pub fn next<'c>(collection: &'c [Page], page: &Page) -> Result<Option<&'c Page>, LookupError> {
    adjacent(collection, page, Direction::Next)
}
