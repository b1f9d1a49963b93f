//! Caption delivery.
//!
//! [`TelegramPublisher`] posts to the Telegram Bot API: `sendPhoto` when the
//! caption carries a photo, `sendMessage` otherwise, always with HTML parse
//! mode. [`RecordingPublisher`] keeps deliveries in memory.

use std::cell::RefCell;

#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::caption::Caption;
use crate::{Result, WikifeatError};

pub const TELEGRAM_API: &str = "https://api.telegram.org";

/// Delivers a caption to one channel.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    async fn publish(&self, channel: &str, caption: &Caption) -> Result<()>;
}

impl<T: Publisher> Publisher for &T {
    async fn publish(&self, channel: &str, caption: &Caption) -> Result<()> {
        (**self).publish(channel, caption).await
    }
}

/// Request body of a Bot API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BotRequest<'a> {
    Photo { chat_id: &'a str, photo: &'a str, caption: &'a str, parse_mode: &'static str },
    Message { chat_id: &'a str, text: &'a str, parse_mode: &'static str },
}

impl<'a> BotRequest<'a> {
    pub fn for_caption(channel: &'a str, caption: &'a Caption) -> Self {
        match &caption.photo {
            Some(photo) => BotRequest::Photo { chat_id: channel, photo, caption: &caption.text, parse_mode: "HTML" },
            None => BotRequest::Message { chat_id: channel, text: &caption.text, parse_mode: "HTML" },
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            BotRequest::Photo { .. } => "sendPhoto",
            BotRequest::Message { .. } => "sendMessage",
        }
    }
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// [`Publisher`] backed by the Telegram Bot API.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct TelegramPublisher {
    client: Client,
    token: String,
    api_base: String,
}

#[cfg(feature = "fetch")]
impl TelegramPublisher {
    pub fn new(token: impl Into<String>, timeout: u64) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(WikifeatError::Config("Telegram bot token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(WikifeatError::HttpError)?;
        Ok(Self { client, token, api_base: TELEGRAM_API.to_string() })
    }

    /// Point at a Bot API server other than the public one.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }
}

#[cfg(feature = "fetch")]
impl Publisher for TelegramPublisher {
    async fn publish(&self, channel: &str, caption: &Caption) -> Result<()> {
        let request = BotRequest::for_caption(channel, caption);
        let response = self
            .client
            .post(self.endpoint(request.method()))
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<BotResponse>(&body).ok();
        let accepted = parsed.as_ref().is_some_and(|r| r.ok);

        if !(200..300).contains(&status) || !accepted {
            let description = parsed.and_then(|r| r.description).unwrap_or(body);
            return Err(WikifeatError::Publish { status, body: description });
        }

        tracing::info!(%channel, method = request.method(), "Published caption");
        Ok(())
    }
}

/// One delivery captured by [`RecordingPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: String,
    pub caption: Caption,
}

/// Keeps every delivery in memory instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    deliveries: RefCell<Vec<Delivery>>,
    reject: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every delivery fails.
    pub fn rejecting() -> Self {
        Self { deliveries: RefCell::default(), reject: true }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.borrow().clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(&self, channel: &str, caption: &Caption) -> Result<()> {
        if self.reject {
            return Err(WikifeatError::Publish { status: 400, body: "Bad Request: chat not found".to_string() });
        }
        self.deliveries
            .borrow_mut()
            .push(Delivery { channel: channel.to_string(), caption: caption.clone() });
        Ok(())
    }
}
