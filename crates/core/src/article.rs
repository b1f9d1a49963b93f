//! The featured article and its image.
//!
//! [`Image`] can only be built through [`Image::new`], which refuses to
//! produce an image without a license or without attribution: a picture we
//! cannot credit is not published at all.

use std::collections::BTreeSet;

use serde::Serialize;

/// A featured article as it will be published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Article title, never empty.
    pub title: String,
    /// Paragraph texts in page order.
    pub paragraphs: Vec<String>,
    /// Absolute URL of the full article.
    pub link: String,
    /// Illustration with license and attribution, if one could be resolved.
    pub image: Option<Image>,
}

/// An image rendition together with what its license requires us to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    source: String,
    licenses: BTreeSet<String>,
    page_url: String,
    author_html: String,
}

impl Image {
    /// Builds an image, or `None` if there is no license or no attribution.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wikifeat_core::Image;
    ///
    /// let licenses = ["CC BY-SA".to_string()].into_iter().collect();
    /// let image = Image::new("https://upload.wikimedia.org/a.jpg", licenses, "https://commons.wikimedia.org/wiki/File:A.jpg", "автор: Jane");
    /// assert!(image.is_some());
    ///
    /// let image = Image::new("https://upload.wikimedia.org/a.jpg", Default::default(), "https://commons.wikimedia.org/wiki/File:A.jpg", "автор: Jane");
    /// assert!(image.is_none());
    /// ```
    pub fn new(
        source: impl Into<String>,
        licenses: BTreeSet<String>,
        page_url: impl Into<String>,
        author_html: impl Into<String>,
    ) -> Option<Self> {
        let author_html = author_html.into();
        if licenses.is_empty() || author_html.trim().is_empty() {
            return None;
        }
        Some(Self { source: source.into(), licenses, page_url: page_url.into(), author_html })
    }

    /// URL of the chosen rendition.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Normalized license labels, sorted and deduplicated.
    pub fn licenses(&self) -> &BTreeSet<String> {
        &self.licenses
    }

    /// URL of the media description page.
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Attribution as restricted HTML, prefix included (e.g. `автор: ...`).
    pub fn author_html(&self) -> &str {
        &self.author_html
    }

    pub fn has_license(&self, license: &str) -> bool {
        self.licenses.contains(license)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn licenses(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_image_requires_license() {
        assert!(Image::new("s", BTreeSet::new(), "p", "автор: A").is_none());
    }

    #[test]
    fn test_image_requires_author() {
        assert!(Image::new("s", licenses(&["CC0"]), "p", "   ").is_none());
    }

    #[test]
    fn test_image_accessors() {
        let image = Image::new("s", licenses(&["CC BY", "CC0", "CC BY"]), "p", "автор: A").unwrap();
        assert_eq!(image.source(), "s");
        assert_eq!(image.page_url(), "p");
        assert_eq!(image.author_html(), "автор: A");
        assert_eq!(image.licenses().len(), 2);
        assert!(image.has_license("CC0"));
    }

    #[test]
    fn test_article_serialization() {
        let article = Article {
            title: "Anthony Roll".to_string(),
            paragraphs: vec!["The Anthony Roll is a record.".to_string()],
            link: "https://en.wikipedia.org/wiki/Anthony_Roll".to_string(),
            image: Image::new("https://upload.wikimedia.org/a.jpg", licenses(&["Public domain"]), "p", "автор: A"),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains(r#""title":"Anthony Roll""#));
        assert!(json.contains(r#""licenses":["Public domain"]"#));
        assert!(json.contains(r#""author_html":"автор: A""#));
    }
}
