//! Page layouts and URL handling.
//!
//! Which block holds the featured article depends on the page that is being
//! polled. Layouts form a closed set; adding one means a new [`PageKind`]
//! variant and a handler in [`crate::locate`].
//!
//! Pages may also be served through the Wayback Machine, which rewrites
//! every link as `/web/<timestamp>/<original URL>`. The helpers here undo
//! or adjust that rewriting.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{Result, WikifeatError};

/// Host of the archival proxy.
pub const DEFAULT_ARCHIVE_HOST: &str = "web.archive.org";

/// Block label that marks the featured article on the Russian home page.
pub const FEATURED_LABEL: &str = "Избранная статья";

/// Link texts that point to the full featured article on the English home page.
pub const FULL_ARTICLE_LINKS: [&str; 4] = ["Full article...", "Full article…", "more...", "more…"];

static ARCHIVE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://[^/]+/web/)([0-9]+)/").unwrap());

/// The layouts the locator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Russian home page: `div#main-tfa`, labelled block.
    HomeVariantA,
    /// English home page: `div#mp-tfa`, "Full article..." link.
    HomeVariantB,
    /// Any other article, treated as featured itself.
    GenericArticle,
}

impl PageKind {
    /// Decide the layout from the percent-decoded path of `url`.
    ///
    /// ```rust
    /// use url::Url;
    /// use wikifeat_core::layout::PageKind;
    ///
    /// let url = Url::parse("https://ru.wikipedia.org/wiki/%D0%97%D0%B0%D0%B3%D0%BB%D0%B0%D0%B2%D0%BD%D0%B0%D1%8F_%D1%81%D1%82%D1%80%D0%B0%D0%BD%D0%B8%D1%86%D0%B0").unwrap();
    /// assert_eq!(PageKind::detect(&url), PageKind::HomeVariantA);
    /// ```
    pub fn detect(url: &Url) -> Self {
        let path = urlencoding::decode(url.path())
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| url.path().to_string());

        if path.contains("/Заглавная_страница") {
            PageKind::HomeVariantA
        } else if path.contains("/Main_Page") {
            PageKind::HomeVariantB
        } else {
            PageKind::GenericArticle
        }
    }

    /// CSS selector of the block holding the article.
    pub fn block_selector(self) -> &'static str {
        match self {
            PageKind::HomeVariantA => "div#main-tfa",
            PageKind::HomeVariantB => "div#mp-tfa",
            PageKind::GenericArticle => "div#mw-content-text",
        }
    }
}

/// Parse an absolute URL.
pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| WikifeatError::InvalidUrl(format!("{}: {}", url, e)))
}

/// `scheme://host[:port]` of `url`.
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

pub fn is_archived(url: &Url, archive_host: &str) -> bool {
    url.host_str().is_some_and(|host| host.eq_ignore_ascii_case(archive_host))
}

/// Make an `href` found on `page` absolute.
///
/// On the archival proxy, `/web/<timestamp>/<original>` becomes
/// `https://<archive>/web/2/<original>`, which redirects to the most recent
/// snapshot rather than the one the page was captured with.
///
/// ```rust
/// use url::Url;
/// use wikifeat_core::layout::resolve_href;
///
/// let page = Url::parse("https://web.archive.org/web/20240619223918/https://ru.wikipedia.org/wiki/X").unwrap();
/// assert_eq!(
///     resolve_href(&page, "/web/20240619223918/https://ru.wikipedia.org/wiki/Y", "web.archive.org").unwrap(),
///     "https://web.archive.org/web/2/https://ru.wikipedia.org/wiki/Y"
/// );
/// ```
pub fn resolve_href(page: &Url, href: &str, archive_host: &str) -> Result<String> {
    if is_archived(page, archive_host)
        && let Some(rest) = href.strip_prefix("/web/")
        && let Some((_timestamp, original)) = rest.split_once('/')
    {
        return Ok(format!("https://{}/web/2/{}", archive_host, original));
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Ok(format!("https://{}", rest));
    }

    page.join(href)
        .map(|url| url.to_string())
        .map_err(|e| WikifeatError::InvalidUrl(format!("{}: {}", href, e)))
}

/// Ask the archival proxy for the raw captured file instead of its viewer
/// frame: `/web/<ts>/...` → `/web/<ts>if_/...`. Other URLs are returned as is.
///
/// ```rust
/// use wikifeat_core::layout::raw_snapshot_url;
///
/// assert_eq!(
///     raw_snapshot_url("https://web.archive.org/web/20240101000000/https://upload.wikimedia.org/a.jpg"),
///     "https://web.archive.org/web/20240101000000if_/https://upload.wikimedia.org/a.jpg"
/// );
/// ```
pub fn raw_snapshot_url(url: &str) -> String {
    ARCHIVE_TIMESTAMP.replace(url, "${1}${2}if_/").into_owned()
}

/// Whether `href` leads to a wiki article, directly or through the proxy.
pub fn is_article_href(href: &str) -> bool {
    href.starts_with("/wiki/") || (href.starts_with("/web/") && href.contains("/wiki/"))
}

/// Whether a link points to a media description page rather than an article.
pub fn is_file_link(href: &str, title: Option<&str>) -> bool {
    const FILE_NAMESPACES: [&str; 3] = ["File:", "Файл:", "Image:"];

    let decoded = urlencoding::decode(href)
        .map(|h| h.into_owned())
        .unwrap_or_else(|_| href.to_string());

    FILE_NAMESPACES.iter().any(|ns| {
        decoded.contains(&format!("/wiki/{}", ns)) || title.is_some_and(|t| t.starts_with(ns))
    })
}
