//! Content loader - loads pages from the source directory

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{FrontMatter, Page};
use crate::Site;

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    site: &'a Site,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Load every Markdown/MDX page below the source directory
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let source_dir = &self.site.source_dir;
        if !source_dir.exists() {
            tracing::warn!("Source directory {:?} does not exist", source_dir);
            return Ok(Vec::new());
        }

        let mut pages = Vec::new();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            // Skip data and include directories
            let relative = path.strip_prefix(source_dir).unwrap_or(path);
            let first_component = relative
                .components()
                .next()
                .and_then(|c| c.as_os_str().to_str());
            if first_component.is_some_and(|first| first.starts_with('_')) {
                continue;
            }

            if path.is_file() && is_content_file(path) {
                match self.load_page(path) {
                    Ok(page) => pages.push(page),
                    Err(e) => {
                        tracing::warn!("Failed to load page {:?}: {:#}", path, e);
                    }
                }
            }
        }

        Ok(pages)
    }

    /// Load a single page from a file
    fn load_page(&self, path: &Path) -> Result<Page> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let file_modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        let date = fm
            .parse_date()
            .or(file_modified)
            .unwrap_or_else(Utc::now);

        let relative = path.strip_prefix(&self.site.source_dir).unwrap_or(path);
        let url = match &fm.permalink {
            Some(permalink) => permalink.clone(),
            None => url_for_source(relative),
        };

        let excerpt = split_excerpt(body, &self.site.config.excerpt_separator);

        Ok(Page {
            url,
            input_path: path.to_path_buf(),
            title: fm.title,
            description: fm.description,
            date,
            excerpt,
            page_type: fm.mdx_type.unwrap_or_default(),
            body: body.to_string(),
            permalink: fm.permalink,
            nav: fm.mdx_nav,
            tags: fm.tags,
            exclude_from_collections: fm.exclude_from_collections,
            extra: fm.extra,
        })
    }
}

/// Derive the output URL of a source file relative to the source directory
///
/// `index.md` -> `/`, `about.md` -> `/about/`, `posts/hello.mdx` -> `/posts/hello/`
pub fn url_for_source(relative: &Path) -> String {
    let stem = relative.with_extension("");
    let mut parts: Vec<String> = stem
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .map(str::to_string)
        .collect();

    if parts.last().is_some_and(|last| last == "index") {
        parts.pop();
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", parts.join("/"))
    }
}

/// Raw markup before the excerpt separator, if the body contains one
pub fn split_excerpt(body: &str, separator: &str) -> Option<String> {
    if separator.is_empty() {
        return None;
    }
    body.find(separator)
        .map(|pos| body[..pos].trim().to_string())
        .filter(|excerpt| !excerpt.is_empty())
}

/// Check if a file is a content file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PageType;
    use std::path::PathBuf;

    #[test]
    fn test_url_for_source() {
        assert_eq!(url_for_source(Path::new("index.md")), "/");
        assert_eq!(url_for_source(Path::new("about.md")), "/about/");
        assert_eq!(url_for_source(Path::new("posts/index.mdx")), "/posts/");
        assert_eq!(url_for_source(Path::new("posts/hello.mdx")), "/posts/hello/");
    }

    #[test]
    fn test_split_excerpt() {
        let body = "Short intro.\n<!-- excerpt -->\nThe rest.";
        assert_eq!(
            split_excerpt(body, "<!-- excerpt -->"),
            Some("Short intro.".to_string())
        );
        assert_eq!(split_excerpt("No separator", "<!-- excerpt -->"), None);
    }

    #[test]
    fn test_load_pages() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("site");
        fs::create_dir_all(source.join("posts")).unwrap();
        fs::create_dir_all(source.join("_includes")).unwrap();
        fs::write(
            source.join("index.md"),
            "---\ntitle: Home\nmdxNav:\n  key: Home\n  order: 0\n---\n# Welcome\n",
        )
        .unwrap();
        fs::write(
            source.join("posts/first.mdx"),
            "---\ntitle: First\nmdxType: post\ndate: 2024-03-01\ntags: posts\n---\nIntro\n<!-- excerpt -->\nMore\n",
        )
        .unwrap();
        fs::write(source.join("_includes/skip.md"), "ignored").unwrap();
        fs::write(source.join("notes.txt"), "ignored").unwrap();

        let site = Site::with_config(dir.path(), crate::config::SiteConfig::default());
        let pages = ContentLoader::new(&site).load_pages().unwrap();
        assert_eq!(pages.len(), 2);

        let home = pages.iter().find(|p| p.url == "/").unwrap();
        assert_eq!(home.title.as_deref(), Some("Home"));
        assert!(home.nav.is_some());

        let post = pages.iter().find(|p| p.url == "/posts/first/").unwrap();
        assert_eq!(post.page_type, PageType::Post);
        assert_eq!(post.excerpt.as_deref(), Some("Intro"));
        assert_eq!(post.date.format("%Y-%m-%d").to_string(), "2024-03-01");
        assert_eq!(post.input_path, PathBuf::from(source.join("posts/first.mdx")));
    }
}
