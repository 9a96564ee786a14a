//! Component styles and the per-render style collector
//!
//! A [`Style`] is a list of CSS blocks whose selectors use `&` for the
//! component's own class. Styles are written in Tailwind notation and
//! compiled once; the class name is derived from the compiled CSS so equal
//! styles share one class.
//!
//! A [`StyleCollector`] records every style used by one render. Rules are
//! recorded through a [`StyleScope`], which seals the collector when it is
//! dropped, whatever way the render exits.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};

use super::tailwind;

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct Block {
    selector: String,
    media: Option<String>,
    declarations: Vec<Declaration>,
}

/// Styling attached to a component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    blocks: Vec<Block>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a Tailwind class list, e.g. `"p-2 hover:(text-white bg-gray-800) md:grid-cols-5"`
    pub fn tw(classes: &str) -> Self {
        let mut style = Self::new();
        for token in tokenize(classes) {
            style.apply(&token, "&", None);
        }
        style
    }

    /// Add a plain declaration to the base block
    pub fn decl(mut self, property: &str, value: &str) -> Self {
        self.block_mut("&", None).declarations.push(Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important: false,
        });
        self
    }

    /// Nest `inner` under a selector relative to the component, such as
    /// `"tr:nth-child(odd)"` or `"& > *"`
    pub fn nest(mut self, selector: &str, inner: Style) -> Self {
        for block in inner.blocks {
            let selector = nest_selector(selector, &block.selector);
            let target = self.block_mut(&selector, block.media.as_deref());
            target.declarations.extend(block.declarations);
        }
        self
    }

    /// Append another style; later declarations win
    pub fn extend(mut self, other: Style) -> Self {
        for block in other.blocks {
            let target = self.block_mut(&block.selector, block.media.as_deref());
            target.declarations.extend(block.declarations);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| b.declarations.is_empty())
    }

    /// Content-addressed class name
    pub fn class_name(&self) -> String {
        let hash = blake3::hash(self.to_css("&").as_bytes());
        format!("c-{}", &hash.to_hex()[..10])
    }

    /// CSS text with `&` bound to `.class`
    pub fn to_css(&self, class: &str) -> String {
        let own = if class == "&" {
            "&".to_string()
        } else {
            format!(".{}", class)
        };
        let mut css = String::new();
        for block in self.blocks.iter().filter(|b| !b.declarations.is_empty()) {
            let mut rule = block.selector.replace('&', &own);
            rule.push('{');
            for d in &block.declarations {
                rule.push_str(&d.property);
                rule.push(':');
                rule.push_str(&d.value);
                if d.important {
                    rule.push_str(" !important");
                }
                rule.push(';');
            }
            rule.push('}');
            match &block.media {
                Some(media) => css.push_str(&format!("@media {}{{{}}}", media, rule)),
                None => css.push_str(&rule),
            }
        }
        css
    }

    fn block_mut(&mut self, selector: &str, media: Option<&str>) -> &mut Block {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.selector == selector && b.media.as_deref() == media);
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.blocks.push(Block {
                    selector: selector.to_string(),
                    media: media.map(str::to_string),
                    declarations: Vec::new(),
                });
                self.blocks.len() - 1
            }
        };
        &mut self.blocks[pos]
    }

    /// Apply one token, resolving variant prefixes and groups
    fn apply(&mut self, token: &str, selector: &str, media: Option<&str>) {
        if let Some((variant, rest)) = split_variant(token) {
            match variant {
                "hover" | "focus" | "visited" | "active" => {
                    let selector = format!("{}:{}", selector, variant);
                    self.apply(rest, &selector, media);
                }
                _ => match tailwind::breakpoint(variant) {
                    Some(query) => self.apply(rest, selector, Some(&query)),
                    None => tracing::debug!("Unknown variant {:?} in {:?}", variant, token),
                },
            }
            return;
        }

        if let Some(group) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            for inner in tokenize(group) {
                self.apply(&inner, selector, media);
            }
            return;
        }

        let (name, important) = match token.strip_suffix('!') {
            Some(name) => (name, true),
            None => (token, false),
        };

        if name == "container" {
            self.push(selector, media, "width", "100%", important);
            for (bp, width) in tailwind::BREAKPOINTS {
                let query = tailwind::breakpoint(bp).unwrap_or_default();
                self.push(selector, Some(&query), "max-width", width, important);
            }
            return;
        }

        if let Some((property, value)) = short_css(name) {
            self.push(selector, media, property, value, important);
            return;
        }

        match tailwind::utility(name) {
            Some(declarations) => {
                for (property, value) in declarations {
                    self.push(selector, media, &property, &value, important);
                }
            }
            None => tracing::debug!("Unknown utility class {:?}", name),
        }
    }

    fn push(
        &mut self,
        selector: &str,
        media: Option<&str>,
        property: &str,
        value: &str,
        important: bool,
    ) {
        self.block_mut(selector, media)
            .declarations
            .push(Declaration {
                property: property.to_string(),
                value: value.to_string(),
                important,
            });
    }
}

/// Split a class list on whitespace outside `(...)` and `[...]`
fn tokenize(classes: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in classes.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c.is_whitespace() && depth == 0 {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// `hover:text-white` -> `("hover", "text-white")`; colons inside brackets don't count
fn split_variant(token: &str) -> Option<(&str, &str)> {
    let colon = token.find(':')?;
    let bracket = token.find(['[', '(']).unwrap_or(usize::MAX);
    if colon < bracket {
        Some((&token[..colon], &token[colon + 1..]))
    } else {
        None
    }
}

/// Short css notation: `min-width[30vw]` -> `("min-width", "30vw")`
fn short_css(name: &str) -> Option<(&str, &str)> {
    let open = name.find('[')?;
    let value = name[open + 1..].strip_suffix(']')?;
    let property = &name[..open];
    if property.is_empty() {
        return None;
    }
    Some((property, value))
}

fn nest_selector(outer: &str, inner: &str) -> String {
    outer
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let part = if part.contains('&') {
                part.to_string()
            } else {
                format!("& {}", part)
            };
            inner.replace('&', &part)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Records the CSS of every style used during one render
#[derive(Debug, Default)]
pub struct StyleCollector {
    globals: RefCell<Vec<String>>,
    rules: RefCell<IndexMap<String, String>>,
    sealed: Cell<bool>,
}

impl StyleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start collecting; the returned scope seals the collector when dropped
    pub fn collect(&self) -> StyleScope<'_> {
        if self.sealed.get() {
            tracing::warn!("Style collector already sealed, new rules will be ignored");
        }
        StyleScope { collector: self }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.get()
    }

    /// Collected CSS wrapped in a `<style>` tag, empty when nothing was collected
    pub fn style_tags(&self) -> String {
        let globals = self.globals.borrow();
        let rules = self.rules.borrow();
        if globals.is_empty() && rules.is_empty() {
            return String::new();
        }
        let mut css = globals.concat();
        for rule in rules.values() {
            css.push_str(rule);
        }
        format!(r#"<style data-styled="active">{}</style>"#, css)
    }

    fn seal(&self) {
        if !self.sealed.replace(true) {
            tracing::trace!("Sealed style collector with {} rules", self.rules.borrow().len());
        }
    }
}

/// Handle through which a render records styles
pub struct StyleScope<'a> {
    collector: &'a StyleCollector,
}

impl StyleScope<'_> {
    /// Register a component style and return its class, `None` for empty styles
    pub fn class_for(&self, style: &Style) -> Option<String> {
        if style.is_empty() {
            return None;
        }
        let class = style.class_name();
        if self.collector.sealed.get() {
            return Some(class);
        }
        let mut rules = self.collector.rules.borrow_mut();
        if !rules.contains_key(&class) {
            let css = style.to_css(&class);
            rules.insert(class.clone(), css);
        }
        Some(class)
    }

    /// Register global CSS, emitted ahead of component rules
    pub fn global(&self, css: &str) {
        if self.collector.sealed.get() {
            return;
        }
        let mut globals = self.collector.globals.borrow_mut();
        if !globals.iter().any(|g| g == css) {
            globals.push(css.to_string());
        }
    }
}

impl Drop for StyleScope<'_> {
    fn drop(&mut self) {
        self.collector.seal();
    }
}
