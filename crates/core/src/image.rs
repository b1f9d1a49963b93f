//! Image resolution.
//!
//! A thumbnail on a wiki page links to its media description page. That page
//! lists the available renditions, the license templates and the author or
//! source fields. [`ImageResolver`] turns a thumbnail into an [`Image`] we are
//! allowed to republish, or into `None` when any part of that is missing.
//!
//! Description pages are parsed as-is: license and attribution templates
//! live inside containers that are hidden from readers.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::article::Image;
use crate::caption::CaptionLabels;
use crate::fetch::PageFetcher;
use crate::info::{AttributeMatcher, InfoExtractor};
use crate::layout::{self, DEFAULT_ARCHIVE_HOST};
use crate::parse::{Document, Element};
use crate::text::{collapse_whitespace, map_text_segments, visible_text};
use crate::Result;

static DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,3}(?:[ \u{a0}\u{2009}\u{202f},.]?[0-9]{3})*)\s*[×x]\s*([0-9]{1,3}(?:[ \u{a0}\u{2009}\u{202f},.]?[0-9]{3})*)")
        .unwrap()
});

static VERSIONED_CC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(CC BY(?:-NC)?(?:-SA|-ND)?) [0-9]+(?:\.[0-9]+)*(?: [A-Za-z-]+)?$").unwrap()
});

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https://[^\s<>"']*[^\s<>"'.,;:!?]"#).unwrap());

/// Tunables of image resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageConfig {
    /// Largest acceptable rendition width.
    pub max_width: u32,
    /// Largest acceptable rendition height.
    pub max_height: u32,
    /// License names that mark non-free media; such images are never reused.
    pub fair_use_markers: Vec<String>,
    /// Substrings (lowercase) of author fields that mean "author unknown".
    pub unknown_author_markers: Vec<String>,
    /// `(name, html)`: when an attribution mentions `name`, append `html`.
    pub attribution_enrichment: Vec<(String, String)>,
    /// Host of the archival proxy.
    pub archive_host: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 2500,
            max_height: 2500,
            fair_use_markers: vec!["Fair use".to_string(), "Добросовестное использование".to_string()],
            unknown_author_markers: ["неизвест", "аноним", "unknown", "anonymous"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            attribution_enrichment: vec![(
                "Diego Delso".to_string(),
                "<a href='https://delso.photo/'>delso.photo</a>".to_string(),
            )],
            archive_host: DEFAULT_ARCHIVE_HOST.to_string(),
        }
    }
}

impl ImageConfig {
    fn is_fair_use(&self, license: &str) -> bool {
        let license = license.to_lowercase();
        self.fair_use_markers.iter().any(|m| m.to_lowercase() == license)
    }

    fn is_unknown_author(&self, visible: &str) -> bool {
        let visible = visible.to_lowercase();
        self.unknown_author_markers
            .iter()
            .any(|m| visible.contains(&m.to_lowercase()))
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

/// Resolves thumbnails to licensed, attributed images.
#[derive(Debug, Clone)]
pub struct ImageResolver<F> {
    fetcher: F,
    config: ImageConfig,
    labels: CaptionLabels,
}

impl<F: PageFetcher> ImageResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, config: ImageConfig::default(), labels: CaptionLabels::default() }
    }

    pub fn with_config(mut self, config: ImageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_labels(mut self, labels: CaptionLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Resolve the thumbnail `img` found on the page at `base_url`.
    ///
    /// Returns `Ok(None)` when the image cannot be republished: no link to a
    /// description page, description page gone or rate limited, no fitting
    /// rendition, no license, a fair-use license, or no attribution.
    ///
    /// # Errors
    ///
    /// Transport failures, and a description page answering with a status
    /// other than 200, 404 or 429.
    pub async fn resolve(&self, base_url: &str, img: &Element<'_>) -> Result<Option<Image>> {
        let href = match (img.attr("src"), img.parent().and_then(|parent| parent.attr("href"))) {
            (Some(_), Some(href)) => href.to_string(),
            _ => {
                tracing::debug!("Image is not linked to a description page");
                return Ok(None);
            }
        };

        let base = layout::parse_url(base_url)?;
        let page_url = layout::resolve_href(&base, &href, &self.config.archive_host)?;

        let response = self.fetcher.get(&page_url).await?;
        if matches!(response.status, 404 | 429) {
            tracing::info!(url = %page_url, status = response.status, "Description page unavailable");
            return Ok(None);
        }
        let response = response.require_ok()?;

        let served_from = layout::parse_url(&response.url).unwrap_or_else(|_| base.clone());
        let extractor = InfoExtractor::with_base(layout::origin(&served_from));
        let document = Document::parse(&response.body)?;

        let Some(mut source) = self.choose_rendition(&document, &extractor)? else {
            tracing::debug!(url = %page_url, "No rendition within bounds");
            return Ok(None);
        };

        let licenses = collect_licenses(&document)?;
        if licenses.is_empty() {
            tracing::debug!(url = %page_url, "No license found");
            return Ok(None);
        }
        if licenses.iter().any(|license| self.config.is_fair_use(license)) {
            tracing::info!(url = %page_url, ?licenses, "Fair use image rejected");
            return Ok(None);
        }
        tracing::debug!(?licenses, "Collected licenses");

        if layout::is_archived(&base, &self.config.archive_host) {
            let snapshot = self.fetcher.get(&layout::raw_snapshot_url(&source)).await?;
            if !snapshot.is_ok() {
                tracing::info!(url = %source, status = snapshot.status, "Archived image unavailable");
                return Ok(None);
            }
            source = snapshot.url;
        }

        let Some(author_html) = self.attribution(&document, &extractor)? else {
            tracing::debug!(url = %page_url, "No author or source found");
            return Ok(None);
        };

        tracing::debug!(%source, %author_html, "Resolved image");
        Ok(Image::new(source, licenses, page_url, author_html))
    }

    /// The largest listed rendition within bounds, or the original file when
    /// the page lists no other resolutions.
    fn choose_rendition(&self, document: &Document, extractor: &InfoExtractor) -> Result<Option<String>> {
        if let Some(resolutions) = document.select_first("span.mw-filepage-other-resolutions")? {
            for link in resolutions.select("a[href]")?.iter().rev() {
                if let Some((width, height)) = parse_dimensions(&link.text())
                    && self.config.fits(width, height)
                    && let Some(href) = link.attr("href")
                {
                    tracing::debug!(width, height, "Chose rendition");
                    return Ok(Some(extractor.normalize_href(href)));
                }
            }
            return Ok(None);
        }

        let original = match document.select_first(".fullMedia a[href]")? {
            Some(link) => Some(link),
            None => document.select_first("a.internal[href]")?,
        };
        Ok(original
            .and_then(|link| link.attr("href"))
            .map(|href| extractor.normalize_href(href)))
    }

    /// Author line, or "author unknown, source: ..." built from the source
    /// field when the author is missing or marked unknown.
    fn attribution(&self, document: &Document, extractor: &InfoExtractor) -> Result<Option<String>> {
        let (author, required) =
            match extractor.lookup_by_attribute(document, AttributeMatcher::Class("licensetpl_attr"), None)? {
                Some(required) => (Some(required), true),
                None => (
                    extractor.lookup_by_attribute(document, AttributeMatcher::Id("fileinfotpl_aut"), Some(&["td", "th"]))?,
                    false,
                ),
            };

        let author_unknown = author
            .as_deref()
            .is_none_or(|author| self.config.is_unknown_author(&visible_text(author)));

        if author_unknown
            && let Some(source) =
                extractor.lookup_by_attribute(document, AttributeMatcher::Id("fileinfotpl_src"), Some(&["td", "th"]))?
        {
            let numbered = number_urls(&source);
            return Ok(Some(format!(
                "{}, {}{}",
                self.labels.unknown_author,
                self.labels.source_prefix(&visible_text(&numbered)),
                numbered
            )));
        }

        Ok(author.map(|author| {
            let prefix = self.labels.author_prefix(&visible_text(&author));
            let author = if required { self.enrich(author) } else { author };
            format!("{}{}", prefix, author)
        }))
    }

    /// Append configured links for known photographers. Runs after the
    /// author prefix is chosen.
    fn enrich(&self, mut attribution: String) -> String {
        let visible = visible_text(&attribution);
        for (name, html) in &self.config.attribution_enrichment {
            if visible.contains(name.as_str()) && !attribution.contains(html.as_str()) {
                attribution.push_str(", ");
                attribution.push_str(html);
            }
        }
        attribution
    }
}

/// `"1 024 × 768 pixels"` → `(1024, 768)`.
pub fn parse_dimensions(text: &str) -> Option<(u32, u32)> {
    let caps = DIMENSIONS.captures(text)?;
    let number = |i: usize| -> Option<u32> {
        let digits: String = caps.get(i)?.as_str().chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    };
    Some((number(1)?, number(2)?))
}

/// Drop the version from Creative Commons license names: `CC BY-SA 4.0` →
/// `CC BY-SA`. Other names are returned unchanged.
pub fn normalize_license(license: &str) -> String {
    VERSIONED_CC.replace(license, "$1").into_owned()
}

fn collect_licenses(document: &Document) -> Result<BTreeSet<String>> {
    Ok(document
        .select("[class*=\"licensetpl_short\"]")?
        .iter()
        .map(|el| normalize_license(&collapse_whitespace(&el.text())))
        .filter(|license| !license.is_empty())
        .collect())
}

/// Replace bare `https://` URLs outside tag markup with `[1]`, `[2]`, ...
/// numbered by first appearance; a repeated URL keeps its number.
///
/// ```rust
/// use wikifeat_core::image::number_urls;
///
/// assert_eq!(
///     number_urls("see https://a.org/x, https://b.org/y and https://a.org/x."),
///     "see [1], [2] and [1]."
/// );
/// ```
pub fn number_urls(html: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    map_text_segments(html, |text| {
        BARE_URL
            .replace_all(text, |caps: &Captures| {
                let (url, trailing) = split_trailing(&caps[0]);
                let index = match seen.iter().position(|s| s == url) {
                    Some(index) => index,
                    None => {
                        seen.push(url.to_string());
                        seen.len() - 1
                    }
                };
                format!("[{}]{}", index + 1, trailing)
            })
            .into_owned()
    })
}

/// Split sentence punctuation off the end of a matched URL. A closing
/// parenthesis stays part of the URL only while it has an opening partner
/// inside it, as in `/wiki/Foo_(bar)`.
fn split_trailing(url: &str) -> (&str, &str) {
    let mut end = url.len();
    while let Some(last) = url[..end].chars().next_back() {
        let kept = &url[..end];
        let unbalanced = last == ')' && kept.matches(')').count() > kept.matches('(').count();
        if unbalanced || ".,;:!?".contains(last) {
            end -= last.len_utf8();
        } else {
            break;
        }
    }
    url.split_at(end)
}
