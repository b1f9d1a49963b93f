//! Caption composition.
//!
//! A caption is `head + body + tail`:
//!
//! ```text
//! <b>Title</b>\n\n
//! first paragraph\n\n
//! second paragraph, cut at a sentence boundary.\n\n
//! <a href='...'>Read the article</a>\n\n
//! <a href='...'>Text license: CC BY-SA</a>\n
//! <a href='...'>Image license: CC BY-SA</a> (author: ...)
//! ```
//!
//! Head and tail are always sent in full; the body gets whatever visible
//! length the platform limit leaves over. Photo captions are limited much
//! more tightly than plain messages.

use std::str::FromStr;

use crate::article::{Article, Image};
use crate::text::{escape_attr, escape_text, remove_brackets, visible_length};

/// Language of every user-visible string the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Russian,
    English,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ru" | "russian" => Ok(Self::Russian),
            "en" | "english" => Ok(Self::English),
            _ => Err(format!("Invalid language: {}. Valid options: ru, en", s)),
        }
    }
}

impl Language {
    pub fn labels(self) -> CaptionLabels {
        match self {
            Language::Russian => CaptionLabels::russian(),
            Language::English => CaptionLabels::english(),
        }
    }
}

/// User-visible strings of captions, attributions and console notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLabels {
    pub read_article: &'static str,
    pub text_license: &'static str,
    pub image_license: &'static str,
    pub image_licenses: &'static str,
    pub public_domain: &'static str,
    pub author: &'static str,
    pub authors: &'static str,
    pub unknown_author: &'static str,
    pub source: &'static str,
    pub sources: &'static str,
    pub published: &'static str,
    pub unchanged: &'static str,
}

impl CaptionLabels {
    pub fn russian() -> Self {
        Self {
            read_article: "Читать статью",
            text_license: "Лицензия на текст: CC BY-SA",
            image_license: "Лицензия на изображение",
            image_licenses: "Лицензии на изображение",
            public_domain: "Общественное достояние",
            author: "автор",
            authors: "авторы",
            unknown_author: "автор неизвестен",
            source: "источник",
            sources: "источники",
            published: "Избрана новая статья",
            unchanged: "Избранная статья не изменилась",
        }
    }

    pub fn english() -> Self {
        Self {
            read_article: "Read the article",
            text_license: "Text license: CC BY-SA",
            image_license: "Image license",
            image_licenses: "Image licenses",
            public_domain: "Public domain",
            author: "author",
            authors: "authors",
            unknown_author: "author unknown",
            source: "source",
            sources: "sources",
            published: "New featured article",
            unchanged: "Featured article unchanged",
        }
    }

    /// `"author: "` or `"authors: "`, depending on whether the visible
    /// attribution lists several names.
    pub fn author_prefix(&self, visible: &str) -> String {
        format!("{}: ", if lists_several(visible) { self.authors } else { self.author })
    }

    /// `"source: "` or `"sources: "`, by the same rule.
    pub fn source_prefix(&self, visible: &str) -> String {
        format!("{}: ", if lists_several(visible) { self.sources } else { self.source })
    }
}

impl Default for CaptionLabels {
    fn default() -> Self {
        Self::russian()
    }
}

fn lists_several(visible: &str) -> bool {
    visible.contains(',') || visible.contains(';')
}

/// Maximum visible caption length, per message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLimits {
    pub with_photo: usize,
    pub text_only: usize,
}

impl Default for CaptionLimits {
    fn default() -> Self {
        Self { with_photo: 1024, text_only: 4096 }
    }
}

/// A finished caption and, for photo messages, the photo to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    pub photo: Option<String>,
}

/// Licenses that get a single fixed label instead of being listed.
const PUBLIC_DOMAIN_MARKERS: [&str; 2] = ["Public domain", "PDM"];
const CC0: &str = "CC0";

/// Builds channel-ready captions.
#[derive(Debug, Clone)]
pub struct CaptionComposer {
    labels: CaptionLabels,
    limits: CaptionLimits,
    rules_url: String,
}

impl CaptionComposer {
    /// `rules_url` is where the "text license" link points.
    pub fn new(labels: CaptionLabels, rules_url: impl Into<String>) -> Self {
        Self { labels, limits: CaptionLimits::default(), rules_url: rules_url.into() }
    }

    pub fn with_limits(mut self, limits: CaptionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn compose(&self, article: &Article) -> Caption {
        let head = self.head(article);
        let tail = self.tail(article);
        let limit = if article.image.is_some() { self.limits.with_photo } else { self.limits.text_only };
        let budget = limit.saturating_sub(visible_length(&head) + visible_length(&tail));

        let body = escape_text(&fit(&article.paragraphs, budget));
        tracing::debug!(limit, budget, body_len = body.chars().count(), "Composed caption");

        Caption {
            text: format!("{}{}{}", head, body, tail),
            photo: article.image.as_ref().map(|image| image.source().to_string()),
        }
    }

    pub fn head(&self, article: &Article) -> String {
        format!("<b>{}</b>\n\n", escape_text(&article.title))
    }

    pub fn tail(&self, article: &Article) -> String {
        let mut tail = format!(
            "<a href='{}'>{}</a>\n\n<a href='{}'>{}</a>\n",
            escape_attr(&article.link),
            self.labels.read_article,
            escape_attr(&self.rules_url),
            self.labels.text_license,
        );

        if let Some(image) = &article.image {
            tail.push_str(&format!(
                "<a href='{}'>{}</a> ({})",
                escape_attr(image.page_url()),
                escape_text(&self.license_line(image)),
                image.author_html(),
            ));
        }
        tail
    }

    /// `Image license: X`, `Image licenses: X, Y`, or the fixed public
    /// domain / CC0 label.
    pub fn license_line(&self, image: &Image) -> String {
        let special = if PUBLIC_DOMAIN_MARKERS.iter().any(|m| image.has_license(m)) {
            Some(self.labels.public_domain)
        } else if image.has_license(CC0) {
            Some(CC0)
        } else {
            None
        };

        let licenses = image.licenses();
        match special {
            Some(label) => format!("{}: {}", self.labels.image_license, label),
            None if licenses.len() == 1 => {
                let only = licenses.iter().next().map(String::as_str).unwrap_or_default();
                format!("{}: {}", self.labels.image_license, only)
            }
            None => format!(
                "{}: {}",
                self.labels.image_licenses,
                licenses.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

/// Fit paragraphs into `budget` visible characters.
///
/// Citation brackets are removed first and empty paragraphs dropped. Each
/// paragraph is followed by a blank line. When the next paragraph does not
/// fit, the accumulated text is cut back to the last full sentence that
/// fits; a sentence that seems to end on an initial (`"A. S. Pushkin"`)
/// is not treated as finished. Returns an empty body when no sentence fits.
///
/// ```rust
/// use wikifeat_core::caption::fit;
///
/// let paragraphs = vec!["One. Two.".to_string(), "Three is long.".to_string()];
/// assert_eq!(fit(&paragraphs, 100), "One. Two.\n\nThree is long.\n\n");
/// assert_eq!(fit(&paragraphs, 12), "One. Two.\n\n");
/// ```
pub fn fit(paragraphs: &[String], budget: usize) -> String {
    let mut text = String::new();
    let mut total = 0usize;

    for paragraph in paragraphs {
        let paragraph = remove_brackets(paragraph);
        if paragraph.is_empty() {
            continue;
        }

        let length = paragraph.chars().count() + 2;
        text.push_str(&paragraph);
        if total + length > budget {
            return cut_at_sentence(&text, budget.saturating_sub(2));
        }
        text.push_str("\n\n");
        total += length;
    }

    text
}

fn cut_at_sentence(text: &str, max_chars: usize) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    let Some(mut cut) = truncated.rfind('.') else {
        return String::new();
    };

    while ends_with_initial(&truncated[..cut]) {
        match truncated[..cut].rfind('.') {
            Some(previous) => cut = previous,
            None => return String::new(),
        }
    }

    let kept = &truncated[..cut];
    if kept.trim().is_empty() {
        return String::new();
    }
    format!("{}.\n\n", kept)
}

/// `"... A"`: a lone uppercase letter after whitespace.
fn ends_with_initial(text: &str) -> bool {
    let mut tail = text.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(before)) => before.is_whitespace() && last.is_uppercase(),
        _ => false,
    }
}
