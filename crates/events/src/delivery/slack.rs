//! Slack-compatible incoming-webhook delivery with exponential-backoff retry.
//!
//! [`SlackNotifier`] renders a [`NotificationRequest`] as a Slack message
//! and sends it via HTTP POST. Failed attempts are retried up to three times
//! with exponential backoff (1 s, 2 s, 4 s).

use std::time::Duration;

use async_trait::async_trait;
use mangaka_core::notification::NotificationRequest;
use serde_json::json;

use crate::notifier::{Notifier, NotifyError};

/// Retry delays (exponential backoff: 1s, 2s, 4s).
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack rejects section text longer than 3000 characters.
const MAX_ERROR_TEXT_CHARS: usize = 2800;

// ---------------------------------------------------------------------------
// SlackNotifier
// ---------------------------------------------------------------------------

/// Posts run notifications to a single incoming-webhook URL.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
    retry_delays: Vec<Duration>,
}

impl SlackNotifier {
    /// Create a notifier with a pre-configured HTTP client.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            retry_delays: RETRY_DELAYS.to_vec(),
        })
    }

    /// Override the backoff schedule.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Deliver a message with retry.
    ///
    /// Returns `Ok(())` on the first successful attempt, otherwise the error
    /// from the final attempt.
    async fn deliver(&self, message: &serde_json::Value) -> Result<(), NotifyError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.try_send(message).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Notification delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(message).await.inspect_err(|e| {
            tracing::error!(error = %e, "Notification delivery failed after all retries");
        })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, message: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(
        &self,
        public_url: &str,
        storage_uri: &str,
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.deliver(&success_message(public_url, storage_uri, request))
            .await
    }

    async fn notify_error(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.deliver(&error_message(&error.to_string(), request))
            .await
    }
}

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

/// Render the message for a completed run.
pub fn success_message(
    public_url: &str,
    storage_uri: &str,
    request: &NotificationRequest,
) -> serde_json::Value {
    let headline = format!(":white_check_mark: *{}* is ready", request.target_title);
    json!({
        "text": headline,
        "blocks": [
            { "type": "section", "text": { "type": "mrkdwn", "text": headline } },
            {
                "type": "section",
                "fields": [
                    field("Category", request.output_category.as_str()),
                    field("Mode", &request.execution_mode),
                    field("Source", &request.source_reference),
                    field("Viewer", public_url),
                    field("Storage", storage_uri),
                ]
            }
        ]
    })
}

/// Render the message for a failed run.
///
/// The block view truncates long error text; the top-level `text` field
/// always carries it in full.
pub fn error_message(error_text: &str, request: &NotificationRequest) -> serde_json::Value {
    let headline = format!(":x: Run failed: *{}*", request.target_title);
    json!({
        "text": format!("{headline}\n{error_text}"),
        "blocks": [
            { "type": "section", "text": { "type": "mrkdwn", "text": headline } },
            {
                "type": "section",
                "fields": [
                    field("Category", request.output_category.as_str()),
                    field("Mode", &request.execution_mode),
                    field("Source", &request.source_reference),
                ]
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("```{}```", truncate_chars(error_text, MAX_ERROR_TEXT_CHARS)),
                }
            }
        ]
    })
}

fn field(label: &str, value: &str) -> serde_json::Value {
    json!({ "type": "mrkdwn", "text": format!("*{label}*\n{value}") })
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
