//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! wiki pages and navigating them with CSS selectors, plus the hidden-node
//! predicate shared by page sanitisation and the info extractor.
//!
//! # Example
//!
//! ```rust
//! use wikifeat_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1 id="firstHeading">Title</h1>
//!             <p class="noprint">Edit this page</p>
//!             <p>Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse_sanitized(html).unwrap();
//! assert_eq!(doc.select("p").unwrap().len(), 1);
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::{Result, WikifeatError};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string as-is.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Parses HTML and detaches every hidden element (see [`is_hidden`])
    /// together with its subtree.
    ///
    /// Wiki pages carry print-only navigation, collapsed templates and
    /// screen-reader text that must never reach a caption.
    pub fn parse_sanitized(html: &str) -> Result<Self> {
        let mut doc = Self::parse(html)?;
        let removed = doc.remove_hidden();
        tracing::debug!(removed, "Removed hidden elements");
        Ok(doc)
    }

    fn remove_hidden(&mut self) -> usize {
        let hidden: Vec<_> = self
            .html
            .tree
            .root()
            .descendants()
            .filter(|node| matches!(node.value(), Node::Element(el) if is_hidden(el)))
            .map(|node| node.id())
            .collect();

        for id in &hidden {
            if let Some(mut node) = self.html.tree.get_mut(*id) {
                node.detach();
            }
        }
        hidden.len()
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WikifeatError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wikifeat_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// The first element after `element`'s subtree, in document order,
    /// whose tag name is one of `tags`.
    ///
    /// This is how two-column "label / value" rows are read: the label cell
    /// is matched, and the value is whichever cell comes next.
    pub fn next_element_after(&'_ self, element: &Element<'_>, tags: &[&str]) -> Option<Element<'_>> {
        let anchor = element.element.id();
        let subtree_len = element.element.descendants().count();

        self.html
            .tree
            .root()
            .descendants()
            .skip_while(|node| node.id() != anchor)
            .skip(subtree_len)
            .filter_map(ElementRef::wrap)
            .find(|el| tags.iter().any(|tag| el.value().name().eq_ignore_ascii_case(tag)))
            .map(|el| Element { element: el })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WikifeatError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use wikifeat_core::parse::Document;
///
/// let html = r#"<a href="/wiki/Rust" title="Rust">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("title"), Some("Rust"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    pub(crate) fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Whether the class list contains exactly `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// The parent node, if it is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::new)
    }

    /// The nearest preceding sibling that is an element.
    pub fn prev_sibling_element(&self) -> Option<Element<'a>> {
        self.element.prev_siblings().find_map(ElementRef::wrap).map(Element::new)
    }

    /// Whether `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element<'_>) -> bool {
        let target = other.element.id();
        self.element.descendants().any(|node| node.id() == target)
    }

    /// See [`is_hidden`].
    pub fn is_hidden(&self) -> bool {
        is_hidden(self.element.value())
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WikifeatError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant element matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).next().map(|el| Element { element: el }))
    }
}

/// Whether an element is invisible to a reader.
///
/// An element is hidden when any of these hold:
/// - its `style` declares `display:none` (spacing and case ignored)
/// - it has `aria-hidden="true"`
/// - it has a `hidden` attribute
/// - one of its classes is `noprint` or `hidden` (case ignored)
pub fn is_hidden(element: &scraper::node::Element) -> bool {
    if let Some(style) = element.attr("style") {
        let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.to_lowercase().contains("display:none") {
            return true;
        }
    }

    if element
        .attr("aria-hidden")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    {
        return true;
    }

    if element.attr("hidden").is_some() {
        return true;
    }

    element
        .classes()
        .any(|c| c.eq_ignore_ascii_case("noprint") || c.eq_ignore_ascii_case("hidden"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Test Page</title>
        </head>
        <body>
            <h1 id="firstHeading">Heading</h1>
            <p class="content">Paragraph 1</p>
            <p class="content">Paragraph 2</p>
            <div style="display: NONE">secret</div>
            <span aria-hidden="TRUE">icon</span>
            <div hidden>hidden attr</div>
            <div class="navbox NoPrint">nav</div>
            <a href="https://example.com">Link</a>
            <table>
                <tr><td id="label">Author</td><td>Jane <b>Doe</b></td></tr>
            </table>
        </body>
        </html>
    "#;

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("p.content").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].text(), "Paragraph 1");
        assert_eq!(elements[1].text(), "Paragraph 2");
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(WikifeatError::HtmlParseError(_))));
    }

    #[test]
    fn test_hidden_predicate() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let divs = doc.select("div").unwrap();
        assert!(divs.iter().all(|d| d.is_hidden()));

        let span = doc.select_first("span").unwrap().unwrap();
        assert!(span.is_hidden());

        let p = doc.select_first("p").unwrap().unwrap();
        assert!(!p.is_hidden());
    }

    #[test]
    fn test_parse_sanitized_removes_hidden() {
        let doc = Document::parse_sanitized(SAMPLE_HTML).unwrap();
        let text: String = doc.html().root_element().text().collect();

        assert!(!text.contains("secret"));
        assert!(!text.contains("icon"));
        assert!(!text.contains("hidden attr"));
        assert!(!text.contains("nav"));
        assert!(text.contains("Paragraph 1"));
    }

    #[test]
    fn test_next_element_after() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let label = doc.select_first("#label").unwrap().unwrap();
        let value = doc.next_element_after(&label, &["td", "th"]).unwrap();

        assert_eq!(value.text(), "Jane Doe");
    }

    #[test]
    fn test_next_element_after_skips_own_subtree() {
        let html = r#"<table><tr><th id="l"><td>nested</td></th><td>value</td></tr></table>"#;
        let doc = Document::parse(html).unwrap();
        let label = doc.select_first("#l").unwrap().unwrap();
        let value = doc.next_element_after(&label, &["td"]).unwrap();

        assert!(!label.contains(&value));
    }

    #[test]
    fn test_prev_sibling_and_parent() {
        let html = r#"<div id="outer"><h2>Label</h2><div id="inner"><a href="/x"><img src="a.png"></a></div></div>"#;
        let doc = Document::parse(html).unwrap();
        let inner = doc.select_first("#inner").unwrap().unwrap();
        assert_eq!(inner.prev_sibling_element().unwrap().text(), "Label");

        let img = doc.select_first("img").unwrap().unwrap();
        assert_eq!(img.parent().unwrap().attr("href"), Some("/x"));
    }
}
