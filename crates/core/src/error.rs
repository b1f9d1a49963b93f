//! Error types for wikifeat operations.
//!
//! This module defines the main error type [`WikifeatError`]. Only fatal
//! conditions are errors: an image that cannot be resolved (missing page,
//! no license, no attribution) is reported as `Ok(None)` by the resolver,
//! and an unchanged featured article is a normal run outcome.
//!
//! # Example
//!
//! ```rust
//! use wikifeat_core::{WikifeatError, Result};
//!
//! fn require_title(title: &str) -> Result<&str> {
//!     if title.is_empty() {
//!         return Err(WikifeatError::Layout("featured block has no title".to_string()));
//!     }
//!     Ok(title)
//! }
//! ```

use thiserror::Error;

/// Main error type for featured-article extraction and publishing.
#[derive(Error, Debug)]
pub enum WikifeatError {
    /// HTTP request errors from reqwest.
    ///
    /// Network errors, DNS failures, TLS problems and timeouts.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A page answered with a status the pipeline cannot continue from.
    ///
    /// Raised for the wiki page itself (anything but 200) and for the image
    /// description page (anything but 200, 404 and 429).
    #[error("Unexpected response code {status} from {url}\nResponse body: {body}")]
    UnexpectedStatus { url: String, status: u16, body: String },

    /// The page does not have the structure its layout variant promises.
    #[error("Page layout assumption violated: {0}")]
    Layout(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Checkpoint and snapshot file errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The messaging API rejected a delivery.
    #[error("Publishing failed with status {status}: {body}")]
    Publish { status: u16, body: String },

    /// Incomplete or inconsistent run configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for WikifeatError.
pub type Result<T> = std::result::Result<T, WikifeatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WikifeatError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_unexpected_status_carries_context() {
        let err = WikifeatError::UnexpectedStatus {
            url: "https://ru.wikipedia.org/wiki/X".to_string(),
            status: 503,
            body: "busy".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("https://ru.wikipedia.org/wiki/X"));
        assert!(message.contains("busy"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: WikifeatError = io.into();
        assert!(matches!(err, WikifeatError::Io(_)));
    }
}
