//! Code blocks: syntax highlighting and inline script bundling

use quick_js::{Context, JsValue};
use serde::Serialize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use thiserror::Error;

use crate::helpers::html_escape;

/// Languages whose blocks may be compiled into page scripts
const SCRIPT_LANGS: &[&str] = &["js", "javascript", "mjs", "jsx"];

/// Syntax highlighter for display code blocks
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a highlighter for the named syntect theme, falling back to
    /// `InspiredGitHub` when the theme is unknown
    pub fn new(theme_name: &str) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!("Unknown highlight theme {:?}, using InspiredGitHub", theme_name);
                theme_set
                    .themes
                    .remove("InspiredGitHub")
                    .unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Highlight `code` as a `<pre>` block with one `<div>` per line
    pub fn highlight(&self, code: &str, lang: &str) -> String {
        let lang = if lang.is_empty() { "text" } else { lang };
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let background = self
            .theme
            .settings
            .background
            .map(|c| format!("background-color:#{:02x}{:02x}{:02x};", c.r, c.g, c.b))
            .unwrap_or_default();

        let mut html = format!(
            r#"<pre class="language-{}" style="{}padding:20px">"#,
            html_escape(lang),
            background
        );
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        for line in LinesWithEndings::from(code) {
            let rendered = highlighter
                .highlight_line(line, &self.syntax_set)
                .and_then(|regions| styled_line_to_highlighted_html(&regions, IncludeBackground::No));
            let rendered = match rendered {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::debug!("Highlighting failed for {:?}: {}", lang, e);
                    html_escape(line)
                }
            };
            html.push_str("<div>");
            html.push_str(rendered.trim_end_matches('\n'));
            html.push_str("</div>");
        }
        html.push_str("</pre>");
        html
    }
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to create JS context: {0}")]
    Context(String),

    #[error("Script does not compile: {0}")]
    Syntax(String),
}

/// A bundled script produced by a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptArtifact {
    /// File name under the script directory, e.g. `3f2a….js`
    pub name: String,
    /// Site path the page loads it from
    pub url: String,
    pub code: String,
}

/// Compiles `// @script` code blocks into standalone script files
#[derive(Debug, Clone)]
pub struct ScriptCompiler {
    marker: String,
    script_dir: String,
}

impl ScriptCompiler {
    pub fn new(marker: &str, script_dir: &str) -> Self {
        Self {
            marker: marker.to_string(),
            script_dir: script_dir.trim_matches('/').to_string(),
        }
    }

    /// Script source of a code block carrying the directive marker, if any
    pub fn script_source<'a>(&self, code: &'a str, lang: &str) -> Option<&'a str> {
        if !SCRIPT_LANGS.contains(&lang) {
            return None;
        }
        code.trim_start().strip_prefix(self.marker.as_str())
    }

    /// Syntax-check `source` and bundle it as an isolated script
    pub fn compile(&self, source: &str) -> Result<ScriptArtifact, ScriptError> {
        let context = Context::new().map_err(|e| ScriptError::Context(format!("{:?}", e)))?;

        // The Function constructor parses its body without running it; the
        // source is passed as a string literal so it cannot close the wrapper
        let literal =
            serde_json::to_string(source).map_err(|e| ScriptError::Syntax(e.to_string()))?;
        let check = format!("typeof new Function({})", literal);
        match context.eval(&check) {
            Ok(JsValue::String(kind)) if kind == "function" => {}
            Ok(other) => return Err(ScriptError::Syntax(format!("unexpected {:?}", other))),
            Err(e) => return Err(ScriptError::Syntax(format!("{:?}", e))),
        }

        let code = format!("(function () {{\n{}\n}})();\n", source.trim());
        let hash = blake3::hash(code.as_bytes());
        let name = format!("{}.js", &hash.to_hex()[..16]);
        let url = format!("/{}/{}", self.script_dir, name);
        Ok(ScriptArtifact { name, url, code })
    }
}
