//! The [`Notifier`] interface and its log-only implementation.

use std::sync::Arc;

use async_trait::async_trait;
use mangaka_core::notification::NotificationRequest;

use crate::delivery::slack::SlackNotifier;

/// Environment variable holding the incoming-webhook URL.
pub const WEBHOOK_URL_ENV: &str = "NOTIFY_WEBHOOK_URL";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Delivers run outcomes to a messaging sink.
///
/// The orchestrator logs and discards any error returned here; a failed
/// delivery never fails the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Report a successful run.
    async fn notify(
        &self,
        public_url: &str,
        storage_uri: &str,
        request: &NotificationRequest,
    ) -> Result<(), NotifyError>;

    /// Report a failed run, including the error text verbatim.
    async fn notify_error(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        request: &NotificationRequest,
    ) -> Result<(), NotifyError>;
}

// ---------------------------------------------------------------------------
// LogNotifier
// ---------------------------------------------------------------------------

/// Notifier that only writes to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        public_url: &str,
        storage_uri: &str,
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            category = %request.output_category,
            title = %request.target_title,
            execution_mode = %request.execution_mode,
            source = %request.source_reference,
            public_url,
            storage_uri,
            "Run completed",
        );
        Ok(())
    }

    async fn notify_error(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        tracing::error!(
            category = %request.output_category,
            title = %request.target_title,
            execution_mode = %request.execution_mode,
            source = %request.source_reference,
            error = %error,
            "Run failed",
        );
        Ok(())
    }
}

/// Pick a notifier from the environment.
///
/// Uses [`SlackNotifier`] when `NOTIFY_WEBHOOK_URL` is set and non-empty,
/// otherwise [`LogNotifier`]. A webhook client that cannot be built is
/// reported and also falls back to logging.
pub fn notifier_from_env() -> Arc<dyn Notifier> {
    let url = std::env::var(WEBHOOK_URL_ENV)
        .ok()
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty());

    match url {
        Some(url) => match SlackNotifier::new(url) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build webhook notifier, logging only");
                Arc::new(LogNotifier)
            }
        },
        None => {
            tracing::info!("{WEBHOOK_URL_ENV} not set, notifications go to the log only");
            Arc::new(LogNotifier)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
