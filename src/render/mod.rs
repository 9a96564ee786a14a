//! Content rendering
//!
//! A page body is parsed into an element tree, rendered through the
//! component registry, wrapped in the page shell and finally handed to the
//! [`StyleFinalizer`] together with the styles collected on the way.

mod code;
mod components;
mod markdown;
mod shell;
mod style;
mod tailwind;
mod widgets;

use serde::Serialize;
use std::cell::RefCell;
use thiserror::Error;

pub use code::{Highlighter, ScriptArtifact, ScriptCompiler, ScriptError};
pub use components::{Registry, Renderer, Rule};
pub use markdown::{parse, Element, ElementKind, Node};
pub use style::{Style, StyleCollector, StyleScope};

use crate::config::{SiteConfig, SiteMetadata};
use crate::content::{Collections, Page};
use crate::finalize::{FinalizeError, StyleFinalizer};
use crate::helpers::Helpers;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Page {0} is not in the `all` collection")]
    MissingCollectionItem(String),
}

/// A problem found while rendering that did not stop the render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub page: String,
    pub message: String,
}

/// Everything a rule can see while rendering one page
pub struct RenderContext<'a> {
    pub page: &'a Page,
    pub collections: &'a Collections,
    pub helpers: &'a Helpers,
    pub metadata: &'a SiteMetadata,
    pub jumbotron_image: &'a str,
    pub highlighter: &'a Highlighter,
    pub scripts: &'a ScriptCompiler,
    pub artifacts: RefCell<Vec<ScriptArtifact>>,
    pub diagnostics: RefCell<Vec<Diagnostic>>,
}

/// Shell markup and collected styles of one page, before finalization
#[derive(Debug, Clone)]
pub struct RenderedFragment {
    pub markup: String,
    /// `<style>` tags as collected
    pub styles: String,
    pub scripts: Vec<ScriptArtifact>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A fully rendered page
#[derive(Debug, Clone)]
pub struct Document {
    pub html: String,
    pub scripts: Vec<ScriptArtifact>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Renders pages into finished documents
pub struct ContentRenderer {
    metadata: SiteMetadata,
    jumbotron_image: String,
    highlighter: Highlighter,
    scripts: ScriptCompiler,
    finalizer: StyleFinalizer,
}

impl ContentRenderer {
    pub fn new(config: &SiteConfig) -> Result<Self, FinalizeError> {
        Ok(Self {
            metadata: config.metadata.clone(),
            jumbotron_image: config.jumbotron_image.clone(),
            highlighter: Highlighter::new(&config.highlight_theme),
            scripts: ScriptCompiler::new(&config.script_marker, &config.script_dir),
            finalizer: StyleFinalizer::new(&config.browsers)?,
        })
    }

    /// Render `page` into a complete HTML document
    ///
    /// Pages whose body is their own permalink are returned untouched.
    pub async fn render(
        &self,
        page: &Page,
        collections: &Collections,
        helpers: &Helpers,
    ) -> Result<Document, FinalizeError> {
        if page.is_permalink_sentinel() {
            tracing::debug!("Passing {} through unchanged", page.url);
            return Ok(Document {
                html: page.body.clone(),
                scripts: Vec::new(),
                diagnostics: Vec::new(),
            });
        }

        let fragment = self.render_fragment(page, collections, helpers);
        let html = self
            .finalizer
            .finalize(fragment.markup, fragment.styles)
            .await?;
        Ok(Document {
            html,
            scripts: fragment.scripts,
            diagnostics: fragment.diagnostics,
        })
    }

    /// Render body and shell, collecting styles and scripts
    pub fn render_fragment(
        &self,
        page: &Page,
        collections: &Collections,
        helpers: &Helpers,
    ) -> RenderedFragment {
        let ctx = RenderContext {
            page,
            collections,
            helpers,
            metadata: &self.metadata,
            jumbotron_image: &self.jumbotron_image,
            highlighter: &self.highlighter,
            scripts: &self.scripts,
            artifacts: RefCell::new(Vec::new()),
            diagnostics: RefCell::new(Vec::new()),
        };

        let collector = StyleCollector::new();
        let markup = {
            let scope = collector.collect();
            let renderer = Renderer::new(Registry::shared_content(), &ctx, &scope);
            let mut body = String::new();
            if let Err(e) = renderer.render_markdown(&page.body, &mut body) {
                tracing::error!("Failed to render {}: {}", page.url, e);
                body.clear();
            }
            shell::render(&renderer, &body)
        };

        RenderedFragment {
            markup,
            styles: collector.style_tags(),
            scripts: ctx.artifacts.into_inner(),
            diagnostics: ctx.diagnostics.into_inner(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;

    use super::components::{Registry, Renderer};
    use super::style::StyleCollector;
    use super::{shell, Highlighter, RenderContext, RenderError, ScriptCompiler};
    use crate::config::SiteConfig;
    use crate::content::{Collections, Page};
    use crate::helpers::Helpers;

    /// Site, collections and tooling for rendering in tests
    pub struct Fixture {
        pub config: SiteConfig,
        pub pages: Vec<Page>,
        pub collections: Collections,
        pub helpers: Helpers,
        pub highlighter: Highlighter,
        pub scripts: ScriptCompiler,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_pages(vec![Page::new("/test/", "")])
        }

        /// The first page is the one being rendered
        pub fn with_pages(pages: Vec<Page>) -> Self {
            let config = SiteConfig::default();
            let collections = Collections::build(&pages).unwrap();
            Self {
                helpers: Helpers::new(&config.metadata),
                highlighter: Highlighter::new(&config.highlight_theme),
                scripts: ScriptCompiler::new(&config.script_marker, &config.script_dir),
                config,
                pages,
                collections,
            }
        }

        pub fn page(&self, url: &str) -> &Page {
            self.pages.iter().find(|p| p.url == url).unwrap()
        }

        pub fn context(&self) -> RenderContext<'_> {
            self.context_for(&self.pages[0])
        }

        pub fn context_for<'a>(&'a self, page: &'a Page) -> RenderContext<'a> {
            RenderContext {
                page,
                collections: &self.collections,
                helpers: &self.helpers,
                metadata: &self.config.metadata,
                jumbotron_image: &self.config.jumbotron_image,
                highlighter: &self.highlighter,
                scripts: &self.scripts,
                artifacts: RefCell::new(Vec::new()),
                diagnostics: RefCell::new(Vec::new()),
            }
        }

        pub fn try_render_with(&self, ctx: &RenderContext<'_>, markdown: &str) -> Result<String, RenderError> {
            let collector = StyleCollector::new();
            let scope = collector.collect();
            let renderer = Renderer::new(Registry::shared_content(), ctx, &scope);
            let mut out = String::new();
            renderer.render_markdown(markdown, &mut out)?;
            Ok(out)
        }

        pub fn render_with(&self, ctx: &RenderContext<'_>, markdown: &str) -> String {
            self.try_render_with(ctx, markdown).unwrap()
        }

        pub fn try_render_body(&self, markdown: &str) -> Result<String, RenderError> {
            self.try_render_with(&self.context(), markdown)
        }

        pub fn render_body(&self, markdown: &str) -> String {
            self.try_render_body(markdown).unwrap()
        }

        /// Shell markup and collected style tags for the page at `url`
        pub fn render_shell_with_styles(&self, url: &str, body: &str) -> (String, String) {
            self.shell_for(self.page(url), body)
        }

        pub fn render_shell(&self, url: &str, body: &str) -> String {
            self.render_shell_with_styles(url, body).0
        }

        pub fn render_shell_for(&self, page: &Page, body: &str) -> String {
            self.shell_for(page, body).0
        }

        fn shell_for(&self, page: &Page, body: &str) -> (String, String) {
            let ctx = self.context_for(page);
            let collector = StyleCollector::new();
            let html = {
                let scope = collector.collect();
                let renderer = Renderer::new(Registry::shared_content(), &ctx, &scope);
                shell::render(&renderer, body)
            };
            (html, collector.style_tags())
        }
    }
}
