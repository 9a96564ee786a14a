//! Markdown parsing into an element tree
//!
//! The component registry needs whole elements (a heading's text, a list
//! item's children), so the pulldown-cmark event stream is folded into a
//! small tree first. Footnote definitions are collected into a trailing
//! footnote section whose items carry a `footnote-backref` link.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

lazy_static! {
    /// A self-closing JSX component tag such as `<PostList />`
    static ref COMPONENT_TAG: Regex = Regex::new(r"^\s*<([A-Z][A-Za-z0-9]*)\s*/>\s*$").unwrap();
}

/// Class marking a footnote back-reference link
pub const FOOTNOTE_BACKREF: &str = "footnote-backref";

/// Every element kind the markdown tree can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Heading(u8),
    Paragraph,
    Anchor,
    Blockquote,
    UnorderedList,
    OrderedList,
    ListItem,
    Strong,
    Emphasis,
    Strikethrough,
    Superscript,
    HorizontalRule,
    Checkbox,
    Image,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    DefinitionList,
    DefinitionTerm,
    DefinitionDetails,
    InlineCode,
    CodeBlock,
    Footnotes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Raw HTML, passed through untouched
    Html(String),
    /// An MDX component reference such as `<TableOfContents />`
    Component(String),
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Html(_) | Node::Component(_) => {}
        }
    }
}

/// Markdown extensions enabled for content
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_DEFINITION_LIST
}

/// Parse markdown into a list of top-level nodes
pub fn parse(markdown: &str) -> Vec<Node> {
    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(markdown, options()) {
        builder.push(event);
    }
    builder.finish()
}

#[derive(Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
    footnotes: IndexMap<String, Element>,
    /// Footnote labels in order of first reference
    references: IndexMap<String, usize>,
    table: Option<TableState>,
    html_block: Option<String>,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(block) = self.html_block.as_mut() {
                    block.push_str(&text);
                } else {
                    self.append(Node::Text(text.into_string()));
                }
            }
            Event::Code(code) => self.append(Node::Element(
                Element::new(ElementKind::InlineCode).with_child(Node::Text(code.into_string())),
            )),
            Event::Html(html) => match self.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.append(html_node(&html)),
            },
            Event::InlineHtml(html) => self.append(html_node(&html)),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.append(Node::Text(math.into_string()))
            }
            Event::FootnoteReference(label) => {
                let next = self.references.len() + 1;
                let number = *self.references.entry(label.to_string()).or_insert(next);
                let id = footnote_id(&label);
                let reference = Element::new(ElementKind::Superscript)
                    .with_attr("id", format!("fnref-{}", id))
                    .with_child(Node::Element(
                        Element::new(ElementKind::Anchor)
                            .with_attr("href", format!("#fn-{}", id))
                            .with_child(Node::Text(number.to_string())),
                    ));
                self.append(Node::Element(reference));
            }
            Event::SoftBreak => self.append(Node::Text("\n".to_string())),
            Event::HardBreak => self.append(Node::Html("<br />\n".to_string())),
            Event::Rule => self.append(Node::Element(Element::new(ElementKind::HorizontalRule))),
            Event::TaskListMarker(checked) => {
                let mut checkbox = Element::new(ElementKind::Checkbox);
                if checked {
                    checkbox = checkbox.with_attr("checked", "");
                }
                self.append(Node::Element(checkbox));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let element = match tag {
            Tag::Paragraph => Element::new(ElementKind::Paragraph),
            Tag::Heading { level, id, .. } => {
                let mut heading = Element::new(ElementKind::Heading(level as u8));
                if let Some(id) = id {
                    heading = heading.with_attr("id", id.into_string());
                }
                heading
            }
            Tag::BlockQuote(_) => Element::new(ElementKind::Blockquote),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                Element::new(ElementKind::CodeBlock).with_attr("lang", lang)
            }
            Tag::HtmlBlock => {
                self.html_block = Some(String::new());
                return;
            }
            Tag::List(Some(start)) => {
                let mut list = Element::new(ElementKind::OrderedList);
                if start != 1 {
                    list = list.with_attr("start", start.to_string());
                }
                list
            }
            Tag::List(None) => Element::new(ElementKind::UnorderedList),
            Tag::Item => Element::new(ElementKind::ListItem),
            Tag::FootnoteDefinition(label) => {
                let id = footnote_id(&label);
                Element::new(ElementKind::ListItem)
                    .with_attr("id", format!("fn-{}", id))
                    .with_attr("data-footnote", label.into_string())
            }
            Tag::DefinitionList => Element::new(ElementKind::DefinitionList),
            Tag::DefinitionListTitle => Element::new(ElementKind::DefinitionTerm),
            Tag::DefinitionListDefinition => Element::new(ElementKind::DefinitionDetails),
            Tag::Table(alignments) => {
                self.table = Some(TableState {
                    alignments,
                    ..Default::default()
                });
                Element::new(ElementKind::Table)
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                    table.cell = 0;
                }
                // Header cells come without a row of their own
                self.stack.push(Element::new(ElementKind::TableHead));
                Element::new(ElementKind::TableRow)
            }
            Tag::TableRow => {
                if self.top_kind() == Some(ElementKind::Table) {
                    self.stack.push(Element::new(ElementKind::TableBody));
                }
                if let Some(table) = self.table.as_mut() {
                    table.cell = 0;
                }
                Element::new(ElementKind::TableRow)
            }
            Tag::TableCell => {
                let (kind, align) = match self.table.as_ref() {
                    Some(table) => (
                        if table.in_head {
                            ElementKind::TableHeaderCell
                        } else {
                            ElementKind::TableCell
                        },
                        table.alignments.get(table.cell).copied(),
                    ),
                    None => (ElementKind::TableCell, None),
                };
                let mut cell = Element::new(kind);
                let align = match align {
                    Some(Alignment::Left) => Some("left"),
                    Some(Alignment::Center) => Some("center"),
                    Some(Alignment::Right) => Some("right"),
                    _ => None,
                };
                if let Some(align) = align {
                    cell = cell.with_attr("align", align);
                }
                cell
            }
            Tag::Emphasis => Element::new(ElementKind::Emphasis),
            Tag::Strong => Element::new(ElementKind::Strong),
            Tag::Strikethrough => Element::new(ElementKind::Strikethrough),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link =
                    Element::new(ElementKind::Anchor).with_attr("href", dest_url.into_string());
                if !title.is_empty() {
                    link = link.with_attr("title", title.into_string());
                }
                link
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image =
                    Element::new(ElementKind::Image).with_attr("src", dest_url.into_string());
                if !title.is_empty() {
                    image = image.with_attr("title", title.into_string());
                }
                image
            }
            // Metadata blocks are not enabled; keep the nesting balanced regardless
            _ => Element::new(ElementKind::Paragraph),
        };
        self.stack.push(element);
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::HtmlBlock => {
                if let Some(block) = self.html_block.take() {
                    self.append(html_node(&block));
                }
            }
            TagEnd::Table => {
                if self.top_kind() == Some(ElementKind::TableBody) {
                    self.close();
                }
                self.close();
                self.table = None;
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
                self.close();
                self.close();
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.cell += 1;
                }
                self.close();
            }
            TagEnd::FootnoteDefinition => {
                if let Some(item) = self.stack.pop() {
                    let label = item.attr("data-footnote").unwrap_or_default().to_string();
                    self.footnotes.insert(label, item);
                }
            }
            _ => self.close(),
        }
    }

    fn top_kind(&self) -> Option<ElementKind> {
        self.stack.last().map(|e| e.kind)
    }

    fn close(&mut self) {
        if let Some(element) = self.stack.pop() {
            self.append(Node::Element(element));
        }
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.close();
        }

        if self.footnotes.is_empty() {
            return self.root;
        }

        // Referenced footnotes first, in reference order
        let mut definitions: Vec<(usize, Element)> = self
            .footnotes
            .into_iter()
            .map(|(label, item)| {
                let order = self.references.get(&label).copied().unwrap_or(usize::MAX);
                (order, item)
            })
            .collect();
        definitions.sort_by_key(|(order, _)| *order);

        let mut list = Element::new(ElementKind::OrderedList);
        for (_, mut item) in definitions {
            let label = item.attr("data-footnote").unwrap_or_default().to_string();
            item.attrs.retain(|(name, _)| name != "data-footnote");
            let backref = Element::new(ElementKind::Anchor)
                .with_attr("href", format!("#fnref-{}", footnote_id(&label)))
                .with_attr("class", FOOTNOTE_BACKREF)
                .with_child(Node::Text("↩".to_string()));
            item.children.push(Node::Element(backref));
            list.children.push(Node::Element(item));
        }

        self.root.push(Node::Element(
            Element::new(ElementKind::Footnotes).with_child(Node::Element(list)),
        ));
        self.root
    }
}

fn html_node(html: &str) -> Node {
    match COMPONENT_TAG.captures(html) {
        Some(caps) => Node::Component(caps[1].to_string()),
        None => Node::Html(html.to_string()),
    }
}

fn footnote_id(label: &str) -> String {
    slug::slugify(label)
}
