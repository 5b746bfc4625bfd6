//! Run-outcome notification for the mangaka pipeline.
//!
//! - [`Notifier`]: the delivery interface the orchestrator calls once per run.
//! - [`SlackNotifier`]: posts a formatted message to an incoming-webhook URL,
//!   retrying with exponential backoff.
//! - [`LogNotifier`]: writes the notification to the tracing log only; used
//!   when no webhook is configured.

pub mod delivery;
pub mod notifier;

pub use delivery::slack::SlackNotifier;
pub use notifier::{notifier_from_env, LogNotifier, Notifier, NotifyError};
