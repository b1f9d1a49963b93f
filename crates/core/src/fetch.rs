//! Page fetching.
//!
//! Every network read goes through the [`PageFetcher`] trait so the locator
//! and image resolver can be driven by fixture pages in tests. Fetchers
//! report the status code instead of failing on it: what counts as fatal
//! depends on which page was requested.

use std::collections::HashMap;
#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
#[cfg(feature = "fetch")]
use url::Url;

use crate::{Result, WikifeatError};

/// Identifying user agent, as the Wikimedia User-Agent policy asks for.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "wikifeat/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/petsernik/wikifeat)"
);

/// A fetched page: final URL after redirects, status code and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    /// A 200 response served from `url`.
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self { url: url.into(), status: 200, body: body.into() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Turn any non-200 status into [`WikifeatError::UnexpectedStatus`].
    pub fn require_ok(self) -> Result<Self> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(WikifeatError::UnexpectedStatus { url: self.url, status: self.status, body: self.body })
        }
    }
}

/// Source of pages for the pipeline.
///
/// Implementations follow redirects and return whatever status the final
/// response carried; only transport failures are errors.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn get(&self, url: &str) -> Result<PageResponse>;
}

impl<T: PageFetcher> PageFetcher for &T {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        (**self).get(url).await
    }
}

/// HTTP client configuration for fetching wiki pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent string sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// [`PageFetcher`] backed by reqwest. Redirects are followed.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(WikifeatError::HttpError)?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        let parsed = Url::parse(url).map_err(|e| WikifeatError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .client
            .get(parsed)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        tracing::info!(%url, %final_url, status, bytes = body.len(), "Fetched page");

        Ok(PageResponse { url: final_url, status, body })
    }
}

/// In-memory [`PageFetcher`]: canned responses keyed by URL, 404 otherwise.
///
/// # Example
///
/// ```rust
/// use wikifeat_core::fetch::StaticFetcher;
///
/// let fetcher = StaticFetcher::new()
///     .with_page("https://en.wikipedia.org/wiki/Main_Page", "<html></html>")
///     .with_status("https://commons.wikimedia.org/wiki/File:X.jpg", 429);
/// assert_eq!(fetcher.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, PageResponse>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `url`.
    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        self.pages.insert(url.clone(), PageResponse::ok(url, body));
        self
    }

    /// Answer `url` with `status` and an empty body.
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        self.pages
            .insert(url.clone(), PageResponse { url, status, body: String::new() });
        self
    }

    /// Answer `url` as if it redirected to `final_url`.
    pub fn with_redirect(mut self, url: impl Into<String>, final_url: impl Into<String>) -> Self {
        self.pages.insert(url.into(), PageResponse::ok(final_url, ""));
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn lookup(&self, url: &str) -> Option<PageResponse> {
        self.pages.get(url).cloned()
    }
}

impl PageFetcher for StaticFetcher {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        Ok(self
            .lookup(url)
            .unwrap_or_else(|| PageResponse { url: url.to_string(), status: 404, body: String::new() }))
    }
}

/// Serves canned pages first and delegates everything else to `inner`.
///
/// The CLI uses this to read the wiki page from a saved snapshot while the
/// image description pages still come from the network.
#[derive(Debug, Clone)]
pub struct OverlayFetcher<F> {
    pages: StaticFetcher,
    inner: F,
}

impl<F: PageFetcher> OverlayFetcher<F> {
    pub fn new(pages: StaticFetcher, inner: F) -> Self {
        Self { pages, inner }
    }
}

impl<F: PageFetcher> PageFetcher for OverlayFetcher<F> {
    async fn get(&self, url: &str) -> Result<PageResponse> {
        match self.pages.lookup(url) {
            Some(page) => {
                tracing::debug!(%url, "Serving page from snapshot");
                Ok(page)
            }
            None => self.inner.get(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 30);
        assert!(config.user_agent.starts_with("wikifeat/"));
    }

    #[test]
    fn test_require_ok() {
        assert!(PageResponse::ok("https://a", "x").require_ok().is_ok());

        let err = PageResponse { url: "https://a".into(), status: 500, body: "boom".into() }
            .require_ok()
            .unwrap_err();
        assert!(matches!(err, WikifeatError::UnexpectedStatus { status: 500, .. }));
    }

    #[test]
    fn test_static_fetcher_unknown_is_404() {
        let fetcher = StaticFetcher::new();
        let response = block_on(fetcher.get("https://example.com/missing")).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.url, "https://example.com/missing");
    }

    #[test]
    fn test_static_fetcher_redirect_reports_final_url() {
        let fetcher = StaticFetcher::new().with_redirect("https://a/if_/img", "https://b/img.jpg");
        let response = block_on(fetcher.get("https://a/if_/img")).unwrap();
        assert!(response.is_ok());
        assert_eq!(response.url, "https://b/img.jpg");
    }

    #[test]
    fn test_overlay_prefers_snapshot() {
        let snapshot = StaticFetcher::new().with_page("https://a", "snapshot");
        let inner = StaticFetcher::new()
            .with_page("https://a", "network")
            .with_page("https://b", "network");
        let fetcher = OverlayFetcher::new(snapshot, inner);

        assert_eq!(block_on(fetcher.get("https://a")).unwrap().body, "snapshot");
        assert_eq!(block_on(fetcher.get("https://b")).unwrap().body, "network");
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_fetcher_invalid_url() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let result = block_on(fetcher.get("not-a-url"));
        assert!(matches!(result, Err(WikifeatError::InvalidUrl(_))));
    }
}
