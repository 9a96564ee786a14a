//! sitemap.xml generation

use crate::content::Page;
use crate::helpers::{xml_escape, Helpers};

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Sitemap listing `pages`, usually the `all` collection
pub fn render_sitemap(pages: &[Page], helpers: &Helpers) -> String {
    let mut xml = String::with_capacity(128 + pages.len() * 96);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{}">"#, SITEMAP_NS));
    xml.push('\n');

    for page in pages {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            xml_escape(&helpers.absolute_url(&page.url))
        ));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            helpers.html_date_string(&page.date)
        ));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    tracing::debug!("Sitemap with {} urls", pages.len());
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteMetadata;
    use chrono::{TimeZone, Utc};

    fn helpers() -> Helpers {
        Helpers::new(&SiteMetadata {
            url: "https://example.org".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_sitemap_entries() {
        let pages = vec![
            Page::new("/", "").with_date(Utc.with_ymd_and_hms(2021, 1, 2, 23, 0, 0).unwrap()),
            Page::new("/posts/a&b/", "").with_date(Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap()),
        ];
        let xml = render_sitemap(&pages, &helpers());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains("<loc>https://example.org/</loc>\n    <lastmod>2021-01-02</lastmod>"));
        assert!(xml.contains("<lastmod>2020-12-31</lastmod>"));
        assert!(!xml.contains("a&b"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_empty_sitemap() {
        let xml = render_sitemap(&[], &helpers());
        assert!(!xml.contains("<url>"));
        assert!(xml.contains("</urlset>"));
    }
}
