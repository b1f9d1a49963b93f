//! Restricted-HTML extraction of attribution fields.
//!
//! Media description pages put author, source and attribution text into
//! heterogeneous markup: plain text runs, links, nested identity cards
//! (`vcard` blocks that name a creator), collapsed templates. The walk in
//! this module keeps what a reader sees and renders it as the tiny HTML
//! dialect messaging APIs accept: `<b>` and `<a href='...'>` only.

use scraper::{ElementRef, Node};

use crate::parse::{Document, Element, is_hidden};
use crate::text::{collapse_whitespace, escape_attr, escape_text};
use crate::Result;

/// How a field is located on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMatcher<'m> {
    /// Elements whose `id` equals the value (pages may repeat an id).
    Id(&'m str),
    /// Elements carrying the value as one of their class tokens.
    Class(&'m str),
    /// Elements whose `class` attribute contains the value as a substring.
    ClassContains(&'m str),
}

impl AttributeMatcher<'_> {
    fn selector(&self) -> String {
        match self {
            AttributeMatcher::Id(id) => format!("[id=\"{}\"]", id),
            AttributeMatcher::Class(class) => format!("[class~=\"{}\"]", class),
            AttributeMatcher::ClassContains(class) => format!("[class*=\"{}\"]", class),
        }
    }
}

/// The closed set of node shapes the walk distinguishes.
enum NodeShape<'a> {
    Text(&'a str),
    Hidden,
    Anchor { href: &'a str, element: ElementRef<'a> },
    IdentityCard(ElementRef<'a>),
    Bold(ElementRef<'a>),
    Container(ElementRef<'a>),
    Ignored,
}

fn classify<'a>(value: &'a Node, element: Option<ElementRef<'a>>) -> NodeShape<'a> {
    match value {
        Node::Text(text) => NodeShape::Text(&**text),
        Node::Element(el) => {
            let Some(element) = element else {
                return NodeShape::Ignored;
            };
            if is_hidden(el) {
                NodeShape::Hidden
            } else if el.name() == "a"
                && let Some(href) = el.attr("href")
            {
                NodeShape::Anchor { href, element }
            } else if el.classes().any(|c| c == "vcard") {
                NodeShape::IdentityCard(element)
            } else if matches!(el.name(), "b" | "strong") {
                NodeShape::Bold(element)
            } else {
                NodeShape::Container(element)
            }
        }
        _ => NodeShape::Ignored,
    }
}

/// Renders page fragments as restricted HTML.
///
/// # Example
///
/// ```rust
/// use wikifeat_core::info::InfoExtractor;
/// use wikifeat_core::parse::Document;
///
/// let doc = Document::parse(
///     r#"<table><tr><td>Photo by <a href="//commons.wikimedia.org/wiki/User:Jane">Jane</a></td></tr></table>"#,
/// )
/// .unwrap();
/// let cell = doc.select_first("td").unwrap().unwrap();
///
/// assert_eq!(
///     InfoExtractor::new().extract(&cell).as_deref(),
///     Some("Photo by <a href='https://commons.wikimedia.org/wiki/User:Jane'>Jane</a>")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct InfoExtractor {
    /// Origin (`https://host`) used to absolutize site-relative hrefs.
    base: Option<String>,
}

impl InfoExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `/path` hrefs against `origin` (e.g. `https://commons.wikimedia.org`).
    pub fn with_base(origin: impl Into<String>) -> Self {
        Self { base: Some(origin.into().trim_end_matches('/').to_string()) }
    }

    /// Render the children of `element`, or `None` if nothing visible remains.
    pub fn extract(&self, element: &Element<'_>) -> Option<String> {
        let mut parts = Vec::new();
        self.walk(element.element_ref(), &mut parts);
        let joined = parts.join(" ");
        let joined = joined.trim();
        if joined.is_empty() { None } else { Some(joined.to_string()) }
    }

    fn walk(&self, element: ElementRef<'_>, parts: &mut Vec<String>) {
        for child in element.children() {
            match classify(child.value(), ElementRef::wrap(child)) {
                NodeShape::Text(text) => {
                    let text = collapse_whitespace(text);
                    if !text.is_empty() {
                        parts.push(escape_text(&text));
                    }
                }
                NodeShape::Hidden | NodeShape::Ignored => {}
                NodeShape::Anchor { href, element } => {
                    if let Some(link) = self.render_anchor(href, element) {
                        parts.push(link);
                    }
                }
                NodeShape::IdentityCard(card) => {
                    if let Some(creator) = self.render_creator(card) {
                        parts.push(creator);
                    }
                }
                NodeShape::Bold(bold) => {
                    let mut inner = Vec::new();
                    self.walk(bold, &mut inner);
                    let inner = inner.join(" ");
                    if !inner.trim().is_empty() {
                        parts.push(format!("<b>{}</b>", inner.trim()));
                    }
                }
                NodeShape::Container(container) => self.walk(container, parts),
            }
        }
    }

    /// A `vcard` contributes only its named creator: the creator's link if
    /// it has one, otherwise the creator's text.
    fn render_creator(&self, card: ElementRef<'_>) -> Option<String> {
        let card = Element::new(card);
        let creator = match card.select_first(".fn#creator").ok().flatten() {
            Some(creator) => creator,
            None => card.select_first(".fn").ok().flatten()?,
        };

        if let Some(link) = creator.select_first("a[href]").ok().flatten()
            && let Some(href) = link.attr("href")
        {
            return self.render_anchor(href, link.element_ref());
        }

        let text = collapse_whitespace(&creator.text());
        if text.is_empty() { None } else { Some(escape_text(&text)) }
    }

    fn render_anchor(&self, href: &str, element: ElementRef<'_>) -> Option<String> {
        let text = collapse_whitespace(&element.text().collect::<String>());
        if text.is_empty() {
            return None;
        }
        Some(format!(
            "<a href='{}'>{}</a>",
            escape_attr(&self.normalize_href(href)),
            escape_text(&text)
        ))
    }

    /// `//host/path` → `https://host/path`; `/path` → base origin + path.
    pub fn normalize_href(&self, href: &str) -> String {
        if let Some(rest) = href.strip_prefix("//") {
            format!("https://{}", rest)
        } else if href.starts_with('/')
            && let Some(base) = &self.base
        {
            format!("{}{}", base, href)
        } else {
            href.to_string()
        }
    }

    /// Extract every value cell located by `matcher` and join the results.
    ///
    /// With `cell_after = None` each matched element is itself the value;
    /// otherwise the value is the next element in document order whose tag
    /// is listed (the classic `<td id="label">Author</td><td>value</td>`
    /// row). Non-empty results are joined with `"; "`, each distinct value
    /// once: license templates repeat the same attribution per license.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WikifeatError::HtmlParseError`] if the matcher value
    /// does not form a valid selector.
    pub fn lookup_by_attribute(
        &self,
        document: &Document,
        matcher: AttributeMatcher<'_>,
        cell_after: Option<&[&str]>,
    ) -> Result<Option<String>> {
        let mut results = Vec::new();

        for matched in document.select(&matcher.selector())? {
            let cell = match cell_after {
                None => Some(matched),
                Some(tags) => document.next_element_after(&matched, tags),
            };
            if let Some(value) = cell.and_then(|cell| self.extract(&cell))
                && !results.contains(&value)
            {
                results.push(value);
            }
        }

        tracing::trace!(?matcher, found = results.len(), "Attribute lookup");
        Ok(if results.is_empty() { None } else { Some(results.join("; ")) })
    }
}
