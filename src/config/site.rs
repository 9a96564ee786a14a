//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub metadata: SiteMetadata,

    // Directory
    pub source_dir: String,
    pub output_dir: String,
    pub script_dir: String,
    #[serde(default)]
    pub passthrough: Vec<String>,

    // Writing
    pub excerpt_separator: String,
    pub script_marker: String,
    pub highlight_theme: String,
    pub jumbotron_image: String,

    // Styling
    /// Browserslist queries used for vendor prefixing
    pub browsers: Vec<String>,

    // Output
    pub minify_html: bool,
    pub sitemap: bool,
}

/// Global site metadata, the fallback for page-level title and description
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Default for SiteMetadata {
    fn default() -> Self {
        Self {
            url: "http://example.com".to_string(),
            title: "My Site".to_string(),
            description: String::new(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            metadata: SiteMetadata::default(),

            source_dir: "site".to_string(),
            output_dir: "_site".to_string(),
            script_dir: "scripts".to_string(),
            passthrough: vec!["img".to_string()],

            excerpt_separator: "<!-- excerpt -->".to_string(),
            script_marker: "// @script".to_string(),
            highlight_theme: "InspiredGitHub".to_string(),
            jumbotron_image: "/img/desert.jpg".to_string(),

            browsers: default_browsers(),

            minify_html: true,
            sitemap: true,
        }
    }
}

fn default_browsers() -> Vec<String> {
    vec![
        "last 1 version".to_string(),
        "> 1%".to_string(),
        "IE 10".to_string(),
    ]
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.metadata.title, "My Site");
        assert_eq!(config.source_dir, "site");
        assert_eq!(config.browsers, vec!["last 1 version", "> 1%", "IE 10"]);
        assert!(config.minify_html);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
metadata:
  url: https://blog.example.org
  title: My Blog
browsers:
  - defaults
minify_html: false
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.metadata.title, "My Blog");
        assert_eq!(config.metadata.url, "https://blog.example.org");
        // Partially specified sections keep their defaults
        assert_eq!(config.metadata.description, "");
        assert_eq!(config.browsers, vec!["defaults"]);
        assert!(!config.minify_html);
        assert_eq!(config.output_dir, "_site");
    }
}
