//! Component registry: element kind -> rendering rule
//!
//! Each rule receives the [`Renderer`], which carries the explicit render
//! context and the style scope. Kinds without a rule fall back to a rule that
//! renders nothing, which is how the table-of-contents registry drops every
//! element except headings.

use lazy_static::lazy_static;
use std::collections::HashMap;

use super::markdown::{self, Element, ElementKind, Node, FOOTNOTE_BACKREF};
use super::style::{Style, StyleScope};
use super::{widgets, Diagnostic, RenderContext, RenderError};
use crate::helpers::{attributes, html_escape};

/// A rendering rule
pub type Rule = fn(&Renderer<'_>, &Element, &mut String) -> Result<(), RenderError>;

lazy_static! {
    static ref CONTENT: Registry = Registry::content();
    static ref TABLE_OF_CONTENTS: Registry = Registry::table_of_contents();

    static ref H1: Style = Style::tw("text-gray-700 text-xl font-bold");
    static ref H2: Style = Style::tw("text-gray-600 text-lg font-semibold");
    static ref H3: Style = Style::tw("text-gray-600 text-lg font-thin");
    static ref H4: Style = Style::tw("text-gray-600 font-bold");
    static ref H5: Style = Style::tw("text-gray-600 font-semibold");
    static ref H6: Style = Style::tw("text-gray-600 font-thin");
    static ref ANCHOR: Style =
        Style::tw("text-blue-500 underline hover:text-blue-300 visited:text-purple-300");
    static ref BLOCKQUOTE: Style =
        Style::tw("bg-gradient-to-tr from-white to-gray-200 p-10 font-thin italic");
    static ref UL: Style = Style::tw("list-disc ml-6");
    static ref OL: Style = Style::tw("list-decimal ml-6");
    static ref EMPHASIS: Style = Style::tw("font-semibold");
    static ref DEL: Style = Style::tw("line-through");
    static ref SUP: Style =
        Style::tw("text-sm").nest("a, a:hover, a:visited", Style::tw("text-blue-500!"));
    static ref CHECKBOX: Style = Style::tw("bg-green-800");
    static ref TABLE: Style = Style::tw("table-auto border-collapse min-width[30vw]");
    static ref TBODY: Style = Style::new().nest("tr:nth-child(odd)", Style::tw("bg-gray-100"));
    static ref TH: Style = Style::tw("font-light p-2 text-left");
    static ref TD_LEFT: Style = Style::tw("p-2 border border-gray-600 text-left");
    static ref TD_CENTER: Style = Style::tw("p-2 border border-gray-600 text-center");
    static ref TD_RIGHT: Style = Style::tw("p-2 border border-gray-600 text-right");
    static ref INLINE_CODE: Style =
        Style::tw("font-mono bg-code-light text-code-dark pr-0.5 pl-0.5 rounded font-light");
    static ref BACKREF: Style = Style::tw("text-gray-800");

    static ref TOC_H1: Style = Style::tw("text-blue-600 underline pl-3");
    static ref TOC_H2: Style = Style::tw("text-blue-600 underline pl-6");
    static ref TOC_H3: Style = Style::tw("text-blue-600 underline pl-9");
    static ref TOC_DEEP: Style = Style::tw("text-blue-600 underline pl-12");
}

/// Typed mapping from element kinds to rules
pub struct Registry {
    rules: HashMap<ElementKind, Rule>,
    fallback: Rule,
    raw_html: bool,
}

impl Registry {
    fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: nothing,
            raw_html: false,
        }
    }

    fn with(mut self, kind: ElementKind, rule: Rule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    fn with_headings(mut self, rule: Rule) -> Self {
        for level in 1..=6 {
            self.rules.insert(ElementKind::Heading(level), rule);
        }
        self
    }

    /// Registry used for page bodies
    pub fn content() -> Self {
        use ElementKind::*;

        let mut registry = Self::empty()
            .with_headings(heading)
            .with(ListItem, list_item)
            .with(CodeBlock, code_block)
            .with(Anchor, anchor)
            .with(Image, image)
            .with(Checkbox, checkbox)
            .with(HorizontalRule, horizontal_rule)
            .with(TableCell, table_cell)
            .with(Footnotes, footnotes);
        for kind in [
            Paragraph,
            Blockquote,
            UnorderedList,
            OrderedList,
            Strong,
            Emphasis,
            Strikethrough,
            Superscript,
            Table,
            TableHead,
            TableBody,
            TableRow,
            TableHeaderCell,
            DefinitionList,
            DefinitionTerm,
            DefinitionDetails,
            InlineCode,
        ] {
            registry = registry.with(kind, element);
        }
        registry.raw_html = true;
        registry
    }

    /// Registry that renders headings as table-of-contents links and drops
    /// everything else
    pub fn table_of_contents() -> Self {
        Self::empty().with_headings(toc_link)
    }

    /// Shared instance of [`Registry::content`]
    pub fn shared_content() -> &'static Registry {
        &CONTENT
    }

    /// Shared instance of [`Registry::table_of_contents`]
    pub fn shared_table_of_contents() -> &'static Registry {
        &TABLE_OF_CONTENTS
    }

    pub fn rule(&self, kind: ElementKind) -> Rule {
        self.rules.get(&kind).copied().unwrap_or(self.fallback)
    }
}

/// Renders a node tree through a registry
pub struct Renderer<'r> {
    pub registry: &'r Registry,
    pub ctx: &'r RenderContext<'r>,
    styles: &'r StyleScope<'r>,
    nested: bool,
}

impl<'r> Renderer<'r> {
    pub fn new(registry: &'r Registry, ctx: &'r RenderContext<'r>, styles: &'r StyleScope<'r>) -> Self {
        Self {
            registry,
            ctx,
            styles,
            nested: false,
        }
    }

    /// A renderer for content embedded in this render; components inside it
    /// render nothing
    pub fn nested(&self, registry: &'r Registry) -> Renderer<'r> {
        Renderer {
            registry,
            ctx: self.ctx,
            styles: self.styles,
            nested: true,
        }
    }

    /// Parse markdown and render it
    pub fn render_markdown(&self, source: &str, out: &mut String) -> Result<(), RenderError> {
        self.render_nodes(&markdown::parse(source), out)
    }

    pub fn render_nodes(&self, nodes: &[Node], out: &mut String) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Element(el) => (self.registry.rule(el.kind))(self, el, out)?,
                Node::Text(text) => out.push_str(&html_escape(text)),
                Node::Html(html) => {
                    if self.registry.raw_html {
                        out.push_str(html);
                    }
                }
                Node::Component(name) => {
                    if self.nested {
                        tracing::debug!("Skipping component {} inside nested render", name);
                    } else {
                        widgets::render(self, name, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn render_children(&self, el: &Element, out: &mut String) -> Result<(), RenderError> {
        self.render_nodes(&el.children, out)
    }

    /// Class for a style, recorded in this render's collection
    pub fn class(&self, style: &Style) -> Option<String> {
        self.styles.class_for(style)
    }

    /// ` class="…"` for a style, or nothing when the style is empty
    pub fn class_attr(&self, style: &Style) -> String {
        match self.class(style) {
            Some(class) => attributes([("class", class.as_str())]),
            None => String::new(),
        }
    }

    /// Register global CSS for this render
    pub fn global(&self, css: &str) {
        self.styles.global(css);
    }
}

fn tag_of(kind: ElementKind) -> &'static str {
    use ElementKind::*;
    match kind {
        Heading(1) => "h1",
        Heading(2) => "h2",
        Heading(3) => "h3",
        Heading(4) => "h4",
        Heading(5) => "h5",
        Heading(_) => "h6",
        Paragraph => "p",
        Anchor => "a",
        Blockquote => "blockquote",
        UnorderedList => "ul",
        OrderedList => "ol",
        ListItem => "li",
        Strong => "strong",
        Emphasis => "em",
        Strikethrough => "del",
        Superscript => "sup",
        HorizontalRule => "hr",
        Checkbox => "input",
        Image => "img",
        Table => "table",
        TableHead => "thead",
        TableBody => "tbody",
        TableRow => "tr",
        TableHeaderCell => "th",
        TableCell => "td",
        DefinitionList => "dl",
        DefinitionTerm => "dt",
        DefinitionDetails => "dd",
        InlineCode => "code",
        CodeBlock => "pre",
        Footnotes => "div",
    }
}

fn style_of(kind: ElementKind) -> Option<&'static Style> {
    use ElementKind::*;
    let style: &'static Style = match kind {
        Heading(1) => &H1,
        Heading(2) => &H2,
        Heading(3) => &H3,
        Heading(4) => &H4,
        Heading(5) => &H5,
        Heading(_) => &H6,
        Anchor => &ANCHOR,
        Blockquote => &BLOCKQUOTE,
        UnorderedList => &UL,
        OrderedList => &OL,
        Emphasis => &EMPHASIS,
        Strikethrough => &DEL,
        Superscript => &SUP,
        Checkbox => &CHECKBOX,
        Table => &TABLE,
        TableBody => &TBODY,
        TableHeaderCell => &TH,
        TableCell => &TD_LEFT,
        InlineCode => &INLINE_CODE,
        _ => return None,
    };
    Some(style)
}

/// Opening tag with the element's attributes and its component class merged
/// into any class it already carries
fn open_tag(r: &Renderer<'_>, tag: &str, el: &Element, style: Option<&Style>, out: &mut String) {
    let own_class = style.and_then(|s| r.class(s));
    let mut classes: Vec<&str> = el.attr("class").into_iter().collect();
    if let Some(own) = own_class.as_deref() {
        classes.push(own);
    }
    let class = classes.join(" ");

    out.push('<');
    out.push_str(tag);
    out.push_str(&attributes(
        el.attrs
            .iter()
            .filter(|(name, _)| name != "class")
            .map(|(n, v)| (n.as_str(), v.as_str())),
    ));
    if !class.is_empty() {
        out.push_str(&attributes([("class", class.as_str())]));
    }
    out.push('>');
}

fn wrap(
    r: &Renderer<'_>,
    el: &Element,
    style: Option<&Style>,
    out: &mut String,
) -> Result<(), RenderError> {
    let tag = tag_of(el.kind);
    open_tag(r, tag, el, style, out);
    r.render_children(el, out)?;
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
    Ok(())
}

fn nothing(_: &Renderer<'_>, _: &Element, _: &mut String) -> Result<(), RenderError> {
    Ok(())
}

/// Plain element with its static component style
fn element(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    wrap(r, el, style_of(el.kind), out)
}

fn heading_id(r: &Renderer<'_>, el: &Element) -> String {
    match el.attr("id") {
        Some(id) => id.to_string(),
        None => r.ctx.helpers.slug(&el.text_content()),
    }
}

fn heading(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    let id = heading_id(r, el);
    let mut with_id = Element::new(el.kind).with_attr("id", id);
    with_id
        .attrs
        .extend(el.attrs.iter().filter(|(n, _)| n != "id").cloned());
    with_id.children = el.children.clone();
    wrap(r, &with_id, style_of(el.kind), out)
}

fn anchor(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    wrap(r, el, Some(&*ANCHOR), out)
}

fn image(_: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    let alt = el.text_content();
    out.push_str("<img");
    out.push_str(&attributes(
        el.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str())),
    ));
    out.push_str(&attributes([("alt", alt.as_str())]));
    out.push_str(" />");
    Ok(())
}

fn checkbox(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    out.push_str(r#"<input type="checkbox" disabled"#);
    if el.attr("checked").is_some() {
        out.push_str(" checked");
    }
    out.push_str(&r.class_attr(&CHECKBOX));
    out.push_str(" />");
    Ok(())
}

fn horizontal_rule(_: &Renderer<'_>, _: &Element, out: &mut String) -> Result<(), RenderError> {
    out.push_str("<hr />");
    Ok(())
}

fn table_cell(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    let style: &Style = match el.attr("align") {
        Some("right") => &TD_RIGHT,
        Some("center") => &TD_CENTER,
        _ => &TD_LEFT,
    };
    wrap(r, el, Some(style), out)
}

fn is_backref(node: &Node) -> bool {
    matches!(node, Node::Element(e) if e.kind == ElementKind::Anchor && e.has_class(FOOTNOTE_BACKREF))
}

/// List item; footnote definitions get their back-reference rendered as an arrow
fn list_item(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    if !el.children.iter().any(is_backref) {
        return wrap(r, el, None, out);
    }

    open_tag(r, "li", el, None, out);
    for child in &el.children {
        match child {
            Node::Element(backref) if is_backref(child) => {
                let href = backref.attr("href").unwrap_or_default();
                out.push_str("<a");
                out.push_str(&attributes([("href", href)]));
                out.push_str(&r.class_attr(&BACKREF));
                out.push_str(r#"> <span role="img" aria-label="Back Arrow">↰</span></a>"#);
            }
            other => {
                out.push_str("<span>");
                r.render_nodes(std::slice::from_ref(other), out)?;
                out.push_str("</span>");
            }
        }
    }
    out.push_str("</li>");
    Ok(())
}

fn footnotes(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    out.push_str(r#"<div class="footnotes"><hr />"#);
    r.render_children(el, out)?;
    out.push_str("</div>");
    Ok(())
}

/// Code block: a `// @script` block becomes a page script, anything else is
/// highlighted for display
fn code_block(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    let lang = el.attr("lang").unwrap_or_default();
    let code = el.text_content();
    let ctx = r.ctx;

    if let Some(source) = ctx.scripts.script_source(&code, lang) {
        match ctx.scripts.compile(source) {
            Ok(artifact) => {
                out.push_str(&format!(
                    r#"<script src="{}" defer></script>"#,
                    html_escape(&artifact.url)
                ));
                let mut artifacts = ctx.artifacts.borrow_mut();
                if !artifacts.iter().any(|a| a.name == artifact.name) {
                    artifacts.push(artifact);
                }
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Script block in {} not compiled: {}", ctx.page.url, e);
                ctx.diagnostics.borrow_mut().push(Diagnostic {
                    page: ctx.page.url.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    out.push_str(&ctx.highlighter.highlight(&code, lang));
    Ok(())
}

fn toc_link(r: &Renderer<'_>, el: &Element, out: &mut String) -> Result<(), RenderError> {
    let style: &Style = match el.kind {
        ElementKind::Heading(1) => &TOC_H1,
        ElementKind::Heading(2) => &TOC_H2,
        ElementKind::Heading(3) => &TOC_H3,
        _ => &TOC_DEEP,
    };
    let href = format!("#{}", heading_id(r, el));
    out.push_str("<a");
    out.push_str(&attributes([("href", href.as_str())]));
    out.push_str(&r.class_attr(style));
    out.push('>');
    out.push_str(&html_escape(&el.text_content()));
    out.push_str("</a>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Fixture;
    use super::*;

    #[test]
    fn test_heading_ids() {
        let fixture = Fixture::new();
        let html = fixture.render_body("# Hello World\n\n## Hello World\n\n## Other {#custom}\n");
        assert_eq!(html.matches(r#"id="hello-world""#).count(), 2);
        assert!(html.contains(r#"<h2 id="custom" class="c-"#));
    }

    #[test]
    fn test_distinct_headings_distinct_ids() {
        let fixture = Fixture::new();
        let html = fixture.render_body("## Setup\n\n## Usage\n\n## FAQ\n");
        for id in ["setup", "usage", "faq"] {
            assert!(html.contains(&format!(r#"id="{}""#, id)), "missing {}", id);
        }
    }

    #[test]
    fn test_footnote_backref_arrow() {
        let fixture = Fixture::new();
        let html = fixture.render_body("Text[^1].\n\n[^1]: The note.\n");
        assert!(html.contains(r#"<div class="footnotes"><hr /><ol"#));
        assert!(html.contains(r##"<li id="fn-1"><span><p>The note.</p></span><a href="#fnref-1" class="c-"##));
        assert!(html.contains(r#"> <span role="img" aria-label="Back Arrow">↰</span></a></li>"#));
        assert!(html.contains(r##"<sup id="fnref-1" class="c-"##));
    }

    #[test]
    fn test_emphasis_styled_strong_plain() {
        let fixture = Fixture::new();
        let html = fixture.render_body("Some *soft* and **loud** words\n");
        let emphasis = Style::tw("font-semibold").class_name();
        assert!(html.contains(&format!(r#"<em class="{}">soft</em>"#, emphasis)));
        assert!(html.contains("<strong>loud</strong>"));
    }

    #[test]
    fn test_plain_list_item_unchanged() {
        let fixture = Fixture::new();
        let html = fixture.render_body("- one\n- two\n");
        assert!(html.contains("<li>one</li><li>two</li>"));
    }

    #[test]
    fn test_table_cell_alignment() {
        let fixture = Fixture::new();
        let html = fixture.render_body("| a | b |\n|---|--:|\n| 1 | 2 |\n");
        let left = Style::tw("p-2 border border-gray-600 text-left").class_name();
        let right = Style::tw("p-2 border border-gray-600 text-right").class_name();
        assert!(html.contains(&format!(r#"<td class="{}">1</td>"#, left)));
        assert!(html.contains(&format!(r#"<td align="right" class="{}">2</td>"#, right)));
        assert!(html.contains("<tbody class=\"c-"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let fixture = Fixture::new();
        let html = fixture.render_body("<aside data-x=\"1\">Raw</aside>\n");
        assert!(html.contains("<aside data-x=\"1\">Raw</aside>"));
    }

    #[test]
    fn test_unknown_component_renders_nothing() {
        let fixture = Fixture::new();
        let html = fixture.render_body("Before\n\n<Mystery />\n\nAfter\n");
        assert_eq!(html, "<p>Before</p><p>After</p>");
    }

    #[test]
    fn test_code_block_highlighted() {
        let fixture = Fixture::new();
        let html = fixture.render_body("```rust\nfn main() {}\n```\n");
        assert!(html.starts_with(r#"<pre class="language-rust""#));
        assert!(html.contains("<div>"));
    }

    #[test]
    fn test_script_block_becomes_script_tag() {
        let fixture = Fixture::new();
        let ctx = fixture.context();
        let html = fixture.render_with(&ctx, "```js\n// @script\ndocument.title = 'x';\n```\n");
        let artifacts = ctx.artifacts.borrow();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(
            html,
            format!(r#"<script src="{}" defer></script>"#, artifacts[0].url)
        );
        assert!(artifacts[0].url.starts_with("/scripts/"));
    }

    #[test]
    fn test_broken_script_falls_back_to_display() {
        let fixture = Fixture::new();
        let ctx = fixture.context();
        let html = fixture.render_with(&ctx, "```js\n// @script\nconst = ;\n```\n");
        assert!(html.starts_with(r#"<pre class="language-js""#));
        assert!(ctx.artifacts.borrow().is_empty());
        assert_eq!(ctx.diagnostics.borrow().len(), 1);
    }

    #[test]
    fn test_fallback_rule_renders_nothing() {
        let registry = Registry::table_of_contents();
        let rule = registry.rule(ElementKind::Paragraph);
        let fixture = Fixture::new();
        let ctx = fixture.context();
        let collector = super::super::style::StyleCollector::new();
        let scope = collector.collect();
        let renderer = Renderer::new(&registry, &ctx, &scope);
        let mut out = String::new();
        rule(&renderer, &Element::new(ElementKind::Paragraph), &mut out).unwrap();
        assert!(out.is_empty());
    }
}
