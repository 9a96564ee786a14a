//! mdx-press: renders Markdown/MDX content into self-contained HTML pages
//!
//! Page bodies are rendered through a fixed registry of styled components,
//! wrapped in a page shell with navigation, and the CSS collected on the way
//! is prefixed, minified and purged before it is inlined into each page.

pub mod commands;
pub mod config;
pub mod content;
pub mod finalize;
pub mod helpers;
pub mod navigation;
pub mod render;
pub mod sitemap;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub source_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Site {
    /// Open the site in `base_dir`, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");
        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let output_dir = base_dir.join(&config.output_dir);
        Self {
            config,
            base_dir,
            source_dir,
            output_dir,
        }
    }

    /// Build the site
    pub async fn build(&self) -> Result<commands::build::BuildReport> {
        commands::build::run(self).await
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<bool> {
        commands::clean::run(self)
    }
}
