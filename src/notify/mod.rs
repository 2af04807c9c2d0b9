//! Outbound notifications for sections that have opened up.

pub mod webhook;

use crate::usf::Section;
use async_trait::async_trait;

pub use webhook::DiscordWebhook;

pub const COURSE_OPEN_TITLE: &str = "Course Open!";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook payload has neither content nor embeds")]
    EmptyPayload,
    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Request(#[from] reqwest_middleware::Error),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Everything a notification says, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub mention_targets: Vec<String>,
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
}

impl NotificationPayload {
    /// The message sent when `section` has open seats.
    pub fn course_open(section: &Section, mention_targets: &[String], registration_url: &str) -> Self {
        Self {
            mention_targets: mention_targets.to_vec(),
            title: COURSE_OPEN_TITLE.to_string(),
            description: format!("{} is now open!", section.course_name),
            fields: vec![
                ("CRN".to_string(), section.crn.clone()),
                (
                    "Seats".to_string(),
                    format!("{}/{}", section.open_seats, section.total_seats),
                ),
                ("Add Course".to_string(), registration_url.to_string()),
            ],
        }
    }
}

/// A channel notifications can be delivered to.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}
