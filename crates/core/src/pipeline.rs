//! One check-and-publish pass.
//!
//! A run reads the checkpoint, locates the featured article, composes the
//! caption, delivers it to every channel and only then records the new
//! title. Any error aborts the run before the checkpoint is touched, so the
//! next scheduled run retries the same article.
//!
//! # Example
//!
//! ```rust
//! use wikifeat_core::checkpoint::{CheckpointStore, FileCheckpoint};
//! use wikifeat_core::fetch::StaticFetcher;
//! use wikifeat_core::pipeline::{Pipeline, RunConfig, RunOutcome};
//! use wikifeat_core::publish::RecordingPublisher;
//!
//! let url = "https://en.wikipedia.org/wiki/Anthony_Roll";
//! let page = r#"<h1 id="firstHeading">Anthony Roll</h1><div id="mw-content-text"><p>A record.</p></div>"#;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let checkpoint = FileCheckpoint::new(dir.path().join("last.txt"));
//! let config = RunConfig::builder().channel("@wikifeat").source_url(url).images(false).build();
//! let pipeline = Pipeline::new(config, StaticFetcher::new().with_page(url, page), &checkpoint);
//!
//! let publisher = RecordingPublisher::new();
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let outcome = rt.block_on(pipeline.run(&publisher)).unwrap();
//!
//! assert_eq!(outcome, RunOutcome::Published { title: "Anthony Roll".to_string() });
//! assert_eq!(checkpoint.read().unwrap(), "Anthony Roll");
//! ```

use crate::article::Article;
use crate::caption::{Caption, CaptionComposer, CaptionLimits, Language};
use crate::checkpoint::CheckpointStore;
use crate::fetch::PageFetcher;
use crate::image::ImageConfig;
use crate::locate::FeaturedLocator;
use crate::publish::Publisher;
use crate::{Result, WikifeatError};

/// Default wiki page: the Russian Wikipedia home page.
pub const DEFAULT_SOURCE_URL: &str = "https://ru.wikipedia.org/wiki/Заглавная_страница";

/// Default target of the "text license" link.
pub const DEFAULT_RULES_URL: &str = "https://t.me/wikifeat/4";

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Destination channels, in delivery order.
    pub channels: Vec<String>,
    /// Where the "text license" link points.
    pub rules_url: String,
    /// Wiki page holding the featured article.
    pub source_url: String,
    /// Whether to resolve and attach an image (default: true).
    pub images: bool,
    /// Caption and console language (default: Russian).
    pub language: Language,
    pub image: ImageConfig,
    pub limits: CaptionLimits,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            rules_url: DEFAULT_RULES_URL.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            images: true,
            language: Language::default(),
            image: ImageConfig::default(),
            limits: CaptionLimits::default(),
        }
    }
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::new()
    }

    /// Checks what a publishing run cannot do without.
    ///
    /// # Errors
    ///
    /// [`WikifeatError::Config`] when no channel is configured, a channel is
    /// blank, or the source URL is empty.
    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(WikifeatError::Config("source URL is empty".to_string()));
        }
        if self.channels.is_empty() {
            return Err(WikifeatError::Config("no channels configured".to_string()));
        }
        if self.channels.iter().any(|c| c.trim().is_empty()) {
            return Err(WikifeatError::Config("blank channel identifier".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`RunConfig`].
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self { config: RunConfig::default() }
    }

    /// Adds a destination channel.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.config.channels.push(channel.into());
        self
    }

    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.channels.extend(channels.into_iter().map(Into::into));
        self
    }

    pub fn rules_url(mut self, value: impl Into<String>) -> Self {
        self.config.rules_url = value.into();
        self
    }

    pub fn source_url(mut self, value: impl Into<String>) -> Self {
        self.config.source_url = value.into();
        self
    }

    pub fn images(mut self, value: bool) -> Self {
        self.config.images = value;
        self
    }

    pub fn language(mut self, value: Language) -> Self {
        self.config.language = value;
        self
    }

    pub fn image_config(mut self, value: ImageConfig) -> Self {
        self.config.image = value;
        self
    }

    pub fn limits(mut self, value: CaptionLimits) -> Self {
        self.config.limits = value;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new article went out to every channel.
    Published { title: String },
    /// The featured article is the one published last time.
    Unchanged,
}

/// A located article and its caption, before delivery.
#[derive(Debug, Clone)]
pub struct Draft {
    pub article: Article,
    pub caption: Caption,
}

/// Wires locator, composer and checkpoint together.
pub struct Pipeline<F, C> {
    config: RunConfig,
    locator: FeaturedLocator<F>,
    composer: CaptionComposer,
    checkpoint: C,
}

impl<F: PageFetcher, C: CheckpointStore> Pipeline<F, C> {
    pub fn new(config: RunConfig, fetcher: F, checkpoint: C) -> Self {
        let labels = config.language.labels();
        let locator = FeaturedLocator::new(fetcher)
            .with_images(config.images)
            .with_image_config(config.image.clone())
            .with_labels(labels);
        let composer = CaptionComposer::new(labels, config.rules_url.clone()).with_limits(config.limits);

        Self { config, locator, composer, checkpoint }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Locate the article and compose its caption without publishing
    /// anything. `None` means the featured article is unchanged.
    pub async fn draft(&self) -> Result<Option<Draft>> {
        let last_title = self.checkpoint.read()?;
        tracing::debug!(%last_title, source = %self.config.source_url, "Starting run");

        let Some(article) = self.locator.locate(&last_title, &self.config.source_url).await? else {
            return Ok(None);
        };
        let caption = self.composer.compose(&article);
        Ok(Some(Draft { article, caption }))
    }

    /// Publish a new featured article to every channel, then record it.
    ///
    /// # Errors
    ///
    /// Configuration, locating and delivery errors. Nothing is recorded
    /// when any of them occurs; channels served before a failed delivery
    /// have already received the caption.
    pub async fn run<P: Publisher>(&self, publisher: &P) -> Result<RunOutcome> {
        self.config.validate()?;

        let Some(Draft { article, caption }) = self.draft().await? else {
            return Ok(RunOutcome::Unchanged);
        };

        for channel in &self.config.channels {
            publisher.publish(channel, &caption).await?;
        }
        self.checkpoint.write(&article.title)?;

        tracing::info!(title = %article.title, channels = self.config.channels.len(), "Run complete");
        Ok(RunOutcome::Published { title: article.title })
    }
}
