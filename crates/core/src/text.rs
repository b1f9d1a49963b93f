//! Plain-text helpers used when budgeting and rendering captions.
//!
//! Captions are HTML with a tiny tag vocabulary, but the messaging platform
//! limits their *visible* length. Everything here works on characters, never
//! on bytes.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static REMOVED_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\x1f[\s\x1f]*([.,;:!?)])").unwrap());

/// Stands in for a removed bracket group until whitespace is settled.
const REMOVED: char = '\u{1f}';

/// Remove bracketed citation markers such as `[1]` or `[note 2]`.
///
/// Brackets nest (`a[b[c]d]e` drops everything between the outer pair) and a
/// stray closing bracket is dropped. A removed group separates the words
/// around it and whitespace is collapsed afterwards. Where a group sat right
/// before closing punctuation the gap is closed; spacing elsewhere is left
/// as written.
///
/// ```rust
/// use wikifeat_core::text::remove_brackets;
///
/// assert_eq!(remove_brackets("a[b[c]d]e"), "a e");
/// assert_eq!(remove_brackets("Rust[1][2] is fast[3]."), "Rust is fast.");
/// assert_eq!(remove_brackets("Speed ( fast ) , ok"), "Speed ( fast ) , ok");
/// ```
pub fn remove_brackets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;

    for ch in text.chars().filter(|&c| c != REMOVED) {
        match ch {
            '[' => {
                if depth == 0 {
                    out.push(REMOVED);
                }
                depth += 1;
            }
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }

    let closed = REMOVED_GAP.replace_all(&out, "$1");
    collapse_whitespace(&closed.replace(REMOVED, " "))
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove tag markup, keeping the text between tags.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Apply `f` to every run of text between tags, leaving the tags untouched.
pub fn map_text_segments(html: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for tag in TAG.find_iter(html) {
        out.push_str(&f(&html[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&f(&html[last..]));
    out
}

/// Text a reader actually sees: tags removed, entities decoded.
pub fn visible_text(html: &str) -> String {
    html_escape::decode_html_entities(&strip_tags(html)).into_owned()
}

/// Number of characters a reader sees once the markup is rendered.
///
/// ```rust
/// use wikifeat_core::text::visible_length;
///
/// assert_eq!(visible_length("<b>x</b>&amp;y"), 3);
/// ```
pub fn visible_length(html: &str) -> usize {
    visible_text(html).chars().count()
}

/// Escape text for inclusion in an HTML caption.
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape a value for a single-quoted HTML attribute.
pub fn escape_attr(value: &str) -> String {
    html_escape::encode_single_quoted_attribute(value).into_owned()
}
