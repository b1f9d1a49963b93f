//! Locating the featured article on a wiki page.
//!
//! The page is sanitised before any lookup, so hidden navigation and
//! collapsed templates never end up in titles or paragraphs. The layout is
//! chosen from the URL by [`PageKind::detect`], and each layout has its own
//! handler that finds the block, the title and the article link.

use url::Url;

use crate::article::Article;
use crate::caption::CaptionLabels;
use crate::fetch::PageFetcher;
use crate::image::{ImageConfig, ImageResolver};
use crate::layout::{self, FEATURED_LABEL, FULL_ARTICLE_LINKS, PageKind};
use crate::parse::{Document, Element};
use crate::text::collapse_whitespace;
use crate::{Result, WikifeatError};

/// What a layout handler found on the page.
struct Featured<'d> {
    block: Element<'d>,
    title: String,
    link: String,
}

/// Finds the featured article on a wiki page.
///
/// # Example
///
/// ```rust
/// use wikifeat_core::fetch::StaticFetcher;
/// use wikifeat_core::locate::FeaturedLocator;
///
/// let page = r#"<h1 id="firstHeading">Anthony Roll</h1>
///     <div id="mw-content-text"><p>The Anthony Roll is a record of ships.</p></div>"#;
/// let fetcher = StaticFetcher::new().with_page("https://en.wikipedia.org/wiki/Anthony_Roll", page);
/// let locator = FeaturedLocator::new(fetcher).with_images(false);
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let article = rt.block_on(locator.locate("", "https://en.wikipedia.org/wiki/Anthony_Roll")).unwrap().unwrap();
/// assert_eq!(article.title, "Anthony Roll");
/// assert_eq!(article.paragraphs, ["The Anthony Roll is a record of ships."]);
/// ```
#[derive(Debug, Clone)]
pub struct FeaturedLocator<F> {
    resolver: ImageResolver<F>,
    resolve_images: bool,
}

impl<F: PageFetcher> FeaturedLocator<F> {
    pub fn new(fetcher: F) -> Self {
        Self { resolver: ImageResolver::new(fetcher), resolve_images: true }
    }

    /// Whether thumbnails are resolved at all. When disabled, articles are
    /// always returned without an image.
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.resolve_images = enabled;
        self
    }

    pub fn with_image_config(mut self, config: ImageConfig) -> Self {
        self.resolver = self.resolver.with_config(config);
        self
    }

    pub fn with_labels(mut self, labels: CaptionLabels) -> Self {
        self.resolver = self.resolver.with_labels(labels);
        self
    }

    /// Fetch `wiki_url` and return its featured article, or `None` when it
    /// is the same as `last_title` (or, on the Russian home page, when the
    /// block currently shows something other than a featured article).
    ///
    /// # Errors
    ///
    /// - [`WikifeatError::UnexpectedStatus`] if the page does not answer 200
    /// - [`WikifeatError::Layout`] if the block or the title is missing
    /// - whatever image resolution fails with
    pub async fn locate(&self, last_title: &str, wiki_url: &str) -> Result<Option<Article>> {
        let url = layout::parse_url(wiki_url)?;
        let kind = PageKind::detect(&url);

        let response = self.resolver.fetcher().get(wiki_url).await?.require_ok()?;
        let document = Document::parse_sanitized(&response.body)?;

        let featured = match kind {
            PageKind::HomeVariantA => self.labelled_block(&document, &url)?,
            PageKind::HomeVariantB => Some(self.linked_block(&document, &url)?),
            PageKind::GenericArticle => Some(self.article_page(&document, wiki_url)?),
        };
        let Some(Featured { block, title, link }) = featured else {
            return Ok(None);
        };

        if title.is_empty() {
            return Err(WikifeatError::Layout(format!("Empty featured article title on {}", wiki_url)));
        }
        if title == last_title {
            tracing::info!(%title, "Featured article unchanged");
            return Ok(None);
        }

        let paragraphs: Vec<String> = block
            .select("p")?
            .iter()
            .map(|p| p.text().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let image = match (self.resolve_images, block.select_first("img")?) {
            (true, Some(img)) => self.resolver.resolve(wiki_url, &img).await?,
            _ => None,
        };

        tracing::info!(%title, paragraphs = paragraphs.len(), has_image = image.is_some(), "Located featured article");
        Ok(Some(Article { title, paragraphs, link, image }))
    }

    fn find_block<'d>(&self, document: &'d Document, kind: PageKind) -> Result<Element<'d>> {
        document
            .select_first(kind.block_selector())?
            .ok_or_else(|| WikifeatError::Layout(format!("Block {} not found", kind.block_selector())))
    }

    /// `div#main-tfa`: the block label must read "Избранная статья"; the
    /// title comes from the first article link outside the heading.
    fn labelled_block<'d>(&self, document: &'d Document, url: &Url) -> Result<Option<Featured<'d>>> {
        let block = self.find_block(document, PageKind::HomeVariantA)?;

        let heading = match block.select_first("h2, .main-header")? {
            Some(heading) => Some(heading),
            None => block.prev_sibling_element().filter(is_heading),
        };
        let label = heading.as_ref().map(|h| collapse_whitespace(&h.text())).unwrap_or_default();
        if label != FEATURED_LABEL {
            tracing::warn!(%label, "Block does not hold a featured article");
            return Ok(None);
        }

        let title_link = block.select("a[href][title]")?.into_iter().find(|link| {
            let href = link.attr("href").unwrap_or_default();
            layout::is_article_href(href)
                && !link.has_class("mw-file-description")
                && !layout::is_file_link(href, link.attr("title"))
                && !heading.as_ref().is_some_and(|h| h.contains(link))
        });
        let Some(title_link) = title_link else {
            return Err(WikifeatError::Layout("No article link in featured block".to_string()));
        };

        let title = title_link.attr("title").unwrap_or_default().trim().to_string();
        let link = self.article_link(url, &title_link)?;
        Ok(Some(Featured { block, title, link }))
    }

    /// `div#mp-tfa`: the title is carried by the "Full article..." link.
    fn linked_block<'d>(&self, document: &'d Document, url: &Url) -> Result<Featured<'d>> {
        let block = self.find_block(document, PageKind::HomeVariantB)?;

        let more = block.select("a[href]")?.into_iter().find(|link| {
            let text = link.text().replace('\u{a0}', " ");
            FULL_ARTICLE_LINKS.contains(&text.trim())
        });
        let Some(more) = more else {
            return Err(WikifeatError::Layout("No \"Full article\" link in featured block".to_string()));
        };
        let Some(title) = more.attr("title") else {
            return Err(WikifeatError::Layout("\"Full article\" link has no title".to_string()));
        };

        let title = title.trim().to_string();
        let link = self.article_link(url, &more)?;
        Ok(Featured { block, title, link })
    }

    /// Any other page: the article itself is the featured one.
    fn article_page<'d>(&self, document: &'d Document, wiki_url: &str) -> Result<Featured<'d>> {
        let block = self.find_block(document, PageKind::GenericArticle)?;
        let title = document
            .select_first("h1#firstHeading")?
            .map(|h| h.text().trim().to_string())
            .ok_or_else(|| WikifeatError::Layout("Heading h1#firstHeading not found".to_string()))?;

        Ok(Featured { block, title, link: wiki_url.to_string() })
    }

    fn article_link(&self, url: &Url, link: &Element<'_>) -> Result<String> {
        let href = link.attr("href").unwrap_or_default();
        layout::resolve_href(url, href, &self.resolver.config().archive_host)
    }
}

fn is_heading(element: &Element<'_>) -> bool {
    matches!(element.tag_name().as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6") || element.has_class("main-header")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::StaticFetcher;

    const RU_HOME: &str = "https://ru.wikipedia.org/wiki/Заглавная_страница";
    const EN_HOME: &str = "https://en.wikipedia.org/wiki/Main_Page";

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn locate(url: &str, body: &str, last_title: &str) -> Result<Option<Article>> {
        let locator = FeaturedLocator::new(StaticFetcher::new().with_page(url, body)).with_images(false);
        block_on(locator.locate(last_title, url))
    }

    fn ru_home(label: &str) -> String {
        format!(
            r#"<div id="main-tfa">
                <h2 class="main-header"><a href="/wiki/Проект:Избранные_статьи" title="Проект:Избранные статьи">{label}</a></h2>
                <a href="/wiki/Файл:Foo.jpg" class="mw-file-description" title="Файл:Foo.jpg"><img src="//upload.wikimedia.org/foo.jpg"></a>
                <p><b><a href="/wiki/Foo" title="Foo">Foo</a></b> is a thing[1].</p>
                <p>   </p>
                <p>Second <span class="noprint">[edit]</span>paragraph.</p>
            </div>"#
        )
    }

    #[test]
    fn test_variant_a() {
        let article = locate(RU_HOME, &ru_home("Избранная статья"), "").unwrap().unwrap();

        assert_eq!(article.title, "Foo");
        assert_eq!(article.link, "https://ru.wikipedia.org/wiki/Foo");
        assert_eq!(article.paragraphs, ["Foo is a thing[1].", "Second paragraph."]);
        assert!(article.image.is_none());
    }

    #[test]
    fn test_variant_a_other_label() {
        assert!(locate(RU_HOME, &ru_home("Хорошая статья"), "").unwrap().is_none());
    }

    #[test]
    fn test_variant_a_label_from_previous_sibling() {
        let body = r#"<div><h2>Избранная статья</h2><div id="main-tfa"><p><a href="/wiki/Bar" title="Bar">Bar</a> text.</p></div></div>"#;
        let article = locate(RU_HOME, body, "").unwrap().unwrap();
        assert_eq!(article.title, "Bar");
    }

    #[test]
    fn test_variant_a_unchanged() {
        assert!(locate(RU_HOME, &ru_home("Избранная статья"), "Foo").unwrap().is_none());
    }

    #[test]
    fn test_variant_b() {
        let body = r#"<div id="mp-tfa">
            <p><b><a href="/wiki/Anthony_Roll" title="Anthony Roll">The Anthony Roll</a></b> is a record.</p>
            <p>(<b><a href="/wiki/Anthony_Roll" title="Anthony Roll">Full&nbsp;article...</a></b>)</p>
        </div>"#;
        let article = locate(EN_HOME, body, "").unwrap().unwrap();

        assert_eq!(article.title, "Anthony Roll");
        assert_eq!(article.link, "https://en.wikipedia.org/wiki/Anthony_Roll");
        assert_eq!(article.paragraphs.len(), 2);
    }

    #[test]
    fn test_variant_b_missing_link_is_layout_error() {
        let body = r#"<div id="mp-tfa"><p>No link here.</p></div>"#;
        assert!(matches!(locate(EN_HOME, body, ""), Err(WikifeatError::Layout(_))));
    }

    #[test]
    fn test_generic_article() {
        let url = "https://en.wikipedia.org/wiki/Anthony_Roll";
        let body = r#"<h1 id="firstHeading"> Anthony Roll </h1><div id="mw-content-text"><p>One.</p><p>Two.</p></div>"#;
        let article = locate(url, body, "").unwrap().unwrap();

        assert_eq!(article.title, "Anthony Roll");
        assert_eq!(article.link, url);
        assert_eq!(article.paragraphs, ["One.", "Two."]);
    }

    #[test]
    fn test_missing_block_is_layout_error() {
        let result = locate("https://en.wikipedia.org/wiki/X", "<h1 id='firstHeading'>X</h1>", "");
        assert!(matches!(result, Err(WikifeatError::Layout(_))));
    }

    #[test]
    fn test_empty_title_is_layout_error() {
        let body = r#"<h1 id="firstHeading">  </h1><div id="mw-content-text"><p>One.</p></div>"#;
        let result = locate("https://en.wikipedia.org/wiki/X", body, "");
        assert!(matches!(result, Err(WikifeatError::Layout(_))));
    }

    #[test]
    fn test_unexpected_status() {
        let locator = FeaturedLocator::new(StaticFetcher::new().with_status(EN_HOME, 500));
        let result = block_on(locator.locate("", EN_HOME));
        assert!(matches!(result, Err(WikifeatError::UnexpectedStatus { status: 500, .. })));
    }

    #[test]
    fn test_archived_variant_a_link() {
        let url = "https://web.archive.org/web/20240619223918/https://ru.wikipedia.org/wiki/Заглавная_страница";
        let body = r#"<div id="main-tfa"><h2>Избранная статья</h2>
            <p><a href="/web/20240619223918/https://ru.wikipedia.org/wiki/Foo" title="Foo">Foo</a>.</p></div>"#;
        let article = locate(url, body, "").unwrap().unwrap();
        assert_eq!(article.link, "https://web.archive.org/web/2/https://ru.wikipedia.org/wiki/Foo");
    }
}
