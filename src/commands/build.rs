//! Build the site into the output directory

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::loader::ContentLoader;
use crate::content::Collections;
use crate::helpers::Helpers;
use crate::render::{ContentRenderer, Diagnostic, ScriptArtifact};
use crate::sitemap::render_sitemap;
use crate::Site;

lazy_static! {
    static ref LEADING_DOCTYPE: Regex = Regex::new(r"(?i)^\s*<!doctype[^>]*>").unwrap();
}

/// Outcome of a build
#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages_written: usize,
    pub scripts_written: usize,
    pub files_copied: usize,
    /// Urls of pages that failed to render
    pub failures: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render every page and write the site
pub async fn run(site: &Site) -> Result<BuildReport> {
    let start = std::time::Instant::now();

    let pages = ContentLoader::new(site).load_pages()?;
    let collections = Collections::build(&pages)?;
    let helpers = Helpers::new(&site.config.metadata);
    let renderer = ContentRenderer::new(&site.config)?;
    tracing::info!("Loaded {} pages ({} posts)", pages.len(), collections.posts.len());

    fs::create_dir_all(&site.output_dir)
        .with_context(|| format!("Failed to create {:?}", site.output_dir))?;

    let mut report = BuildReport::default();
    for page in &pages {
        let document = match renderer.render(page, &collections, &helpers).await {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to finalize {}: {}", page.url, e);
                report.failures.push(page.url.clone());
                continue;
            }
        };

        let path = output_path(&site.output_dir, &page.url);
        let html = transform_html(&path, document.html, site.config.minify_html);
        write_file(&path, html.as_bytes())?;
        tracing::debug!("Wrote {:?}", path);
        report.pages_written += 1;

        for script in &document.scripts {
            write_script(site, script)?;
            report.scripts_written += 1;
        }
        report.diagnostics.extend(document.diagnostics);
    }

    for dir in &site.config.passthrough {
        report.files_copied += copy_passthrough(&site.source_dir.join(dir), &site.output_dir.join(dir))?;
    }

    if site.config.sitemap {
        let xml = render_sitemap(&collections.all, &helpers);
        write_file(&site.output_dir.join("sitemap.xml"), xml.as_bytes())?;
    }

    tracing::info!(
        "Built {} pages in {:.2}s ({} failed)",
        report.pages_written,
        start.elapsed().as_secs_f64(),
        report.failures.len()
    );
    Ok(report)
}

/// File a page url is written to: `/a/` -> `a/index.html`, `/feed.xml` -> `feed.xml`
pub fn output_path(output_dir: &Path, url: &str) -> PathBuf {
    let relative = url.trim_matches('/');
    let last = relative.rsplit('/').next().unwrap_or_default();
    if !url.ends_with('/') && last.contains('.') {
        output_dir.join(relative)
    } else {
        output_dir.join(relative).join("index.html")
    }
}

/// Minify HTML output; other files pass through
fn transform_html(path: &Path, html: String, minify: bool) -> String {
    let is_html = path.extension().is_some_and(|ext| ext == "html");
    if !minify || !is_html {
        return html;
    }

    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    let minified = minify_html::minify(html.as_bytes(), &cfg);
    let minified = String::from_utf8_lossy(&minified);
    format!("<!doctype html>{}", LEADING_DOCTYPE.replace(&minified, ""))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

fn write_script(site: &Site, script: &ScriptArtifact) -> Result<()> {
    let path = site
        .output_dir
        .join(site.config.script_dir.trim_matches('/'))
        .join(&script.name);
    if path.exists() {
        return Ok(());
    }
    write_file(&path, script.code.as_bytes())?;
    tracing::debug!("Wrote script {:?}", path);
    Ok(())
}

/// Copy a directory tree verbatim, returning the number of files copied
fn copy_passthrough(from: &Path, to: &Path) -> Result<usize> {
    if !from.exists() {
        tracing::debug!("Passthrough directory {:?} does not exist", from);
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let relative = path.strip_prefix(from).unwrap_or(path);
        let dest = to.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
        copied += 1;
    }
    tracing::info!("Copied {} files from {:?}", copied, from);
    Ok(copied)
}
