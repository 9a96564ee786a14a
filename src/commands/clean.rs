//! Clean the output directory

use anyhow::{Context, Result};
use std::fs;

use crate::Site;

/// Remove the output directory, returning whether anything was deleted
pub fn run(site: &Site) -> Result<bool> {
    if !site.output_dir.exists() {
        tracing::debug!("Nothing to clean at {:?}", site.output_dir);
        return Ok(false);
    }
    fs::remove_dir_all(&site.output_dir)
        .with_context(|| format!("Failed to delete {:?}", site.output_dir))?;
    tracing::info!("Deleted: {:?}", site.output_dir);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(site.output_dir.join("posts")).unwrap();
        fs::write(site.output_dir.join("index.html"), "x").unwrap();

        assert!(run(&site).unwrap());
        assert!(!site.output_dir.exists());
        assert!(!run(&site).unwrap());
    }
}
