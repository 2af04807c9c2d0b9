//! Discord webhook delivery.
//!
//! Messages are posted as JSON to the webhook URL. Optional members are left
//! out of the body entirely rather than sent as `null`.

use crate::notify::{NotificationPayload, Notifier, NotifyError};
use crate::usf::middleware::TracingMiddleware;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const WEBHOOK_USER_AGENT: &str = concat!("seatwatch-webhook/", env!("CARGO_PKG_VERSION"));

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Top-level webhook execution body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub tts: bool,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// RGB packed as `0xRRGGBB`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl WebhookMessage {
    /// Discord rejects a message with nothing in it; so do we, before sending.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.content.is_none() && self.embeds.is_empty() {
            return Err(NotifyError::EmptyPayload);
        }
        Ok(())
    }
}

/// Discord's user mention syntax.
fn mention(user_id: &str) -> String {
    format!("<@!{user_id}>")
}

impl From<&NotificationPayload> for WebhookMessage {
    fn from(payload: &NotificationPayload) -> Self {
        let content = payload
            .mention_targets
            .iter()
            .map(|id| mention(id))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            content: Some(content).filter(|c| !c.is_empty()),
            embeds: vec![Embed {
                title: Some(payload.title.clone()),
                description: Some(payload.description.clone()),
                fields: payload
                    .fields
                    .iter()
                    .map(|(name, value)| EmbedField {
                        name: name.clone(),
                        value: value.clone(),
                        inline: false,
                    })
                    .collect(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}

/// Delivers notifications to a single Discord webhook URL.
pub struct DiscordWebhook {
    http: ClientWithMiddleware,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .no_proxy()
            .build()?;
        Ok(Self {
            http: ClientBuilder::new(client).with(TracingMiddleware).build(),
            url: url.into(),
        })
    }

    /// POST a message as-is.
    pub async fn execute(&self, message: &WebhookMessage) -> Result<(), NotifyError> {
        message.validate()?;

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static(WEBHOOK_USER_AGENT))
            .json(message)
            .send()
            .await
            .map_err(strip_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}

/// The webhook URL embeds its token, so it's kept out of error text.
fn strip_url(err: reqwest_middleware::Error) -> NotifyError {
    match err {
        reqwest_middleware::Error::Reqwest(e) => NotifyError::Transport(e.without_url()),
        other => NotifyError::Request(other),
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        self.execute(&WebhookMessage::from(payload)).await
    }
}
