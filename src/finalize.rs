//! Style finalization
//!
//! The CSS collected during a render goes through vendor prefixing and
//! minification for the configured browsers, then every selector that
//! matches nothing in the page is dropped. The result is inlined as a single
//! `<style>` element in the document head.

use kuchiki::traits::*;
use kuchiki::{Attribute, ExpandedName, NodeRef};
use lazy_static::lazy_static;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::Selector;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;
use markup5ever::{local_name, namespace_url, ns, QualName};
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref STYLE_TAG: Regex = Regex::new(r"(?i)<style[^>]*>|</style\s*>").unwrap();
    /// Pseudo-classes and pseudo-elements that never match a static document
    static ref DYNAMIC_PSEUDO: Regex = Regex::new(
        r"::?(?:hover|focus-within|focus-visible|focus|visited|active|placeholder|before|after|selection|first-line|first-letter|marker|-(?:webkit|moz|ms)-[a-z-]+)"
    )
    .unwrap();
}

#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Invalid browserslist query: {0}")]
    Browserslist(String),

    #[error("CSS error: {0}")]
    Css(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("Style finalization task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Prefixes, minifies and purges collected CSS, then inlines it
#[derive(Debug, Clone)]
pub struct StyleFinalizer {
    targets: Targets,
}

impl StyleFinalizer {
    /// Resolve the browserslist queries the CSS is prefixed for
    pub fn new<S: AsRef<str>>(browsers: &[S]) -> Result<Self, FinalizeError> {
        let queries: Vec<&str> = browsers.iter().map(AsRef::as_ref).collect();
        let browsers = Browsers::from_browserslist(queries)
            .map_err(|e| FinalizeError::Browserslist(e.to_string()))?;
        let targets = match browsers {
            Some(browsers) => Targets::from(browsers),
            None => Targets::default(),
        };
        Ok(Self { targets })
    }

    /// Inline the finalized form of `collected` into `markup`'s head
    pub async fn finalize(&self, markup: String, collected: String) -> Result<String, FinalizeError> {
        let targets = self.targets.clone();
        tokio::task::spawn_blocking(move || finalize_blocking(&markup, &collected, targets)).await?
    }
}

fn finalize_blocking(markup: &str, collected: &str, targets: Targets) -> Result<String, FinalizeError> {
    let css = STYLE_TAG.replace_all(collected, "");
    let document = kuchiki::parse_html().one(markup);

    let css = process_css(&css, &document, targets)?;
    tracing::trace!("Finalized {} bytes of CSS", css.len());

    if let Ok(head) = document.select_first("head") {
        let style = NodeRef::new_element(
            QualName::new(None, ns!(html), local_name!("style")),
            Vec::<(ExpandedName, Attribute)>::new(),
        );
        style.append(NodeRef::new_text(css));
        head.as_node().append(style);
    } else {
        tracing::warn!("Document has no <head>, styles dropped");
    }

    let mut out = Vec::new();
    document.serialize(&mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn process_css(css: &str, document: &NodeRef, targets: Targets) -> Result<String, FinalizeError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| FinalizeError::Css(e.to_string()))?;
    sheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..Default::default()
        })
        .map_err(|e| FinalizeError::Css(e.to_string()))?;

    purge(&mut sheet.rules, document);

    let result = sheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..Default::default()
        })
        .map_err(|e| FinalizeError::Css(e.to_string()))?;
    Ok(result.code)
}

/// Drop selectors matching nothing in `document`, then rules left without selectors
fn purge(rules: &mut CssRuleList<'_>, document: &NodeRef) {
    rules.0.retain_mut(|rule| match rule {
        CssRule::Style(style) => {
            style
                .selectors
                .0
                .retain(|selector| is_used(selector, document));
            !style.selectors.0.is_empty()
        }
        CssRule::Media(media) => {
            purge(&mut media.rules, document);
            !media.rules.0.is_empty()
        }
        _ => true,
    });
}

fn is_used(selector: &Selector<'_>, document: &NodeRef) -> bool {
    let text = match selector.to_css_string(PrinterOptions::default()) {
        Ok(text) => text,
        Err(_) => return true,
    };
    let stripped = DYNAMIC_PSEUDO.replace_all(&text, "");
    let mut query = stripped.trim().to_string();
    if query.is_empty() || query.ends_with(['>', '+', '~']) {
        query.push('*');
    }

    match document.select(&query) {
        Ok(mut matches) => matches.next().is_some(),
        // Keep what the matcher cannot evaluate
        Err(()) => {
            tracing::trace!("Keeping unmatchable selector {:?}", text);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html><html lang="en"><head><title>T</title></head><body><p class="a">x</p><ul class="list"><li>1</li></ul></body></html>"#;

    fn finalizer() -> StyleFinalizer {
        StyleFinalizer::new(&["last 1 version", "> 1%", "IE 10"]).unwrap()
    }

    #[tokio::test]
    async fn test_dead_rules_removed() {
        let collected = r#"<style data-styled="active">.a{color:#ff0000}.b{color:#0000ff}.a:hover{color:#00ff00}.list li{margin:0}@media (min-width: 768px){.b{padding:1rem}.a{padding:2rem}}</style>"#;
        let html = finalizer()
            .finalize(PAGE.to_string(), collected.to_string())
            .await
            .unwrap();
        let css = &html[html.find("<style>").unwrap()..html.find("</style>").unwrap()];

        assert!(css.contains(".a{color:red}"));
        assert!(css.contains(".a:hover"));
        assert!(css.contains(".list li"));
        assert!(css.contains("@media"));
        assert!(!css.contains(".b"));
    }

    #[tokio::test]
    async fn test_empty_media_block_removed() {
        let collected = "@media (min-width: 768px){.b{padding:1rem}}.a{margin:0}";
        let html = finalizer()
            .finalize(PAGE.to_string(), collected.to_string())
            .await
            .unwrap();
        assert!(!html.contains("@media"));
        assert!(html.contains(".a{margin:0}"));
    }

    #[tokio::test]
    async fn test_vendor_prefixes_for_targets() {
        let collected = ".a{user-select:none}";
        let html = finalizer()
            .finalize(PAGE.to_string(), collected.to_string())
            .await
            .unwrap();
        assert!(html.contains("-ms-user-select:none"));
    }

    #[tokio::test]
    async fn test_single_style_block_in_head() {
        let html = finalizer()
            .finalize(PAGE.to_string(), ".a{color:#000}".to_string())
            .await
            .unwrap();
        assert_eq!(html.matches("<style>").count(), 1);
        let head = &html[..html.find("</head>").unwrap()];
        assert!(head.contains("<style>.a{color:#000}</style>"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_invalid_browserslist() {
        let err = StyleFinalizer::new(&["not a real query at all"]).unwrap_err();
        assert!(matches!(err, FinalizeError::Browserslist(_)));
    }

    #[test]
    fn test_dynamic_pseudo_stripped_for_matching() {
        let document = kuchiki::parse_html().one(PAGE);
        let sheet = StyleSheet::parse(
            ".a:hover{color:red}.a::before{content:''}input::placeholder{color:red}*,::after{margin:0}",
            ParserOptions::default(),
        )
        .unwrap();
        let mut kept = Vec::new();
        for rule in &sheet.rules.0 {
            if let CssRule::Style(style) = rule {
                for selector in style.selectors.0.iter() {
                    kept.push(is_used(selector, &document));
                }
            }
        }
        assert_eq!(kept, vec![true, true, false, true, true]);
    }
}
