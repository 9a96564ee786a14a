//! List site content

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::content::loader::ContentLoader;
use crate::content::{Collections, Page, PageType};
use crate::navigation;
use crate::Site;

#[derive(Serialize)]
struct PageSummary<'a> {
    url: &'a str,
    title: Option<&'a str>,
    date: String,
    #[serde(rename = "type")]
    page_type: PageType,
    tags: &'a [String],
}

impl<'a> From<&'a Page> for PageSummary<'a> {
    fn from(page: &'a Page) -> Self {
        Self {
            url: &page.url,
            title: page.title.as_deref(),
            date: page.date.format("%Y-%m-%d").to_string(),
            page_type: page.page_type,
            tags: &page.tags,
        }
    }
}

/// Print site content by type
pub fn run(site: &Site, content_type: &str, json: bool) -> Result<()> {
    print!("{}", render(site, content_type, json)?);
    Ok(())
}

/// Listing of `pages`, `posts` or `nav`, as text or JSON
pub fn render(site: &Site, content_type: &str, json: bool) -> Result<String> {
    let pages = ContentLoader::new(site).load_pages()?;
    let collections = Collections::build(&pages)?;
    let mut out = String::new();

    match content_type {
        "page" | "pages" => {
            if json {
                let summaries: Vec<PageSummary> = pages.iter().map(PageSummary::from).collect();
                out = serde_json::to_string_pretty(&summaries)?;
                out.push('\n');
            } else {
                writeln!(out, "Pages ({}):", pages.len())?;
                for page in &pages {
                    writeln!(
                        out,
                        "  {} - {} [{}]",
                        page.url,
                        page.link_text(),
                        page.input_path.display()
                    )?;
                }
            }
        }
        "post" | "posts" => {
            if json {
                let summaries: Vec<PageSummary> =
                    collections.posts.iter().map(PageSummary::from).collect();
                out = serde_json::to_string_pretty(&summaries)?;
                out.push('\n');
            } else {
                writeln!(out, "Posts ({}):", collections.posts.len())?;
                for post in &collections.posts {
                    writeln!(
                        out,
                        "  {} - {} [{}]",
                        post.date.format("%Y-%m-%d"),
                        post.link_text(),
                        post.url
                    )?;
                }
            }
        }
        "nav" | "navigation" => {
            let items = navigation::nav_list(&collections.nav, "");
            if json {
                let entries: Vec<_> = items.iter().map(|item| item.entry).collect();
                out = serde_json::to_string_pretty(&entries)?;
                out.push('\n');
            } else {
                writeln!(out, "Navigation ({}):", items.len())?;
                for item in items {
                    writeln!(
                        out,
                        "  {} {} -> {}",
                        item.entry.order, item.entry.key, item.entry.url
                    )?;
                }
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: pages, posts, nav",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;

    fn site() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("site");
        fs::create_dir_all(source.join("posts")).unwrap();
        fs::write(
            source.join("index.md"),
            "---\ntitle: Home\nmdxNav:\n  order: 2\n---\nHi",
        )
        .unwrap();
        fs::write(
            source.join("about.md"),
            "---\ntitle: About\nmdxNav:\n  key: Me\n  order: 1\n---\nHi",
        )
        .unwrap();
        fs::write(
            source.join("posts/one.md"),
            "---\ntitle: One\ntags: [posts]\ndate: 2022-02-02\n---\nHi",
        )
        .unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        (dir, site)
    }

    #[test]
    fn test_list_nav_sorted() {
        let (_dir, site) = site();
        let out = render(&site, "nav", false).unwrap();
        assert_eq!(out, "Navigation (2):\n  1 Me -> /about/\n  2 Home -> /\n");
    }

    #[test]
    fn test_list_posts_json() {
        let (_dir, site) = site();
        let out = render(&site, "posts", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["url"], "/posts/one/");
        assert_eq!(value[0]["date"], "2022-02-02");
        assert_eq!(value[0]["type"], "plain");
    }

    #[test]
    fn test_list_pages() {
        let (_dir, site) = site();
        let out = render(&site, "pages", false).unwrap();
        assert!(out.starts_with("Pages (3):\n"));
        assert!(out.contains("  /about/ - About ["));
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, site) = site();
        assert!(render(&site, "tags", false).is_err());
    }
}
