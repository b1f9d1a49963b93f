//! Featured-article extraction and publishing.
//!
//! `wikifeat-core` polls a wiki page, finds the featured article on it,
//! resolves a republishable image with its license and attribution, and
//! composes a caption that fits a messaging platform's length limits.
//!
//! # Example
//!
//! ```rust
//! use wikifeat_core::caption::{CaptionComposer, CaptionLabels};
//! use wikifeat_core::Article;
//!
//! let article = Article {
//!     title: "Anthony Roll".to_string(),
//!     paragraphs: vec!["The Anthony Roll[1] is a record of ships.".to_string()],
//!     link: "https://en.wikipedia.org/wiki/Anthony_Roll".to_string(),
//!     image: None,
//! };
//!
//! let caption = CaptionComposer::new(CaptionLabels::english(), "https://t.me/wikifeat/4").compose(&article);
//! assert!(caption.text.starts_with("<b>Anthony Roll</b>\n\nThe Anthony Roll is a record of ships.\n\n"));
//! ```

pub mod article;
pub mod caption;
pub mod checkpoint;
pub mod error;
pub mod fetch;
pub mod image;
pub mod info;
pub mod layout;
pub mod locate;
pub mod parse;
pub mod pipeline;
pub mod publish;
pub mod text;

pub use article::{Article, Image};
pub use caption::{Caption, CaptionComposer, CaptionLabels, CaptionLimits, Language, fit};
pub use checkpoint::{CheckpointStore, FileCheckpoint};
pub use error::{Result, WikifeatError};
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchConfig, OverlayFetcher, PageFetcher, PageResponse, StaticFetcher};
pub use image::{ImageConfig, ImageResolver};
pub use info::{AttributeMatcher, InfoExtractor};
pub use layout::PageKind;
pub use locate::FeaturedLocator;
pub use parse::Document;
pub use pipeline::{Draft, Pipeline, RunConfig, RunConfigBuilder, RunOutcome};
#[cfg(feature = "fetch")]
pub use publish::TelegramPublisher;
pub use publish::{Publisher, RecordingPublisher};
