//! Per-run execution state.

use std::sync::OnceLock;

use chrono::{FixedOffset, Utc};
use mangaka_core::payload::TaskPayload;
use mangaka_core::safe_title;
use mangaka_core::types::Timestamp;
use tokio_util::sync::CancellationToken;

/// Source of run start times.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// State owned by a single run: the payload, its start time, and the
/// memoised safe title.
///
/// The span is the run's logging context; everything the run logs is
/// emitted inside it.
pub struct ExecutionContext<'a> {
    payload: &'a TaskPayload,
    started_at: Timestamp,
    utc_offset: FixedOffset,
    safe_title: OnceLock<String>,
    cancel: CancellationToken,
    span: tracing::Span,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        payload: &'a TaskPayload,
        started_at: Timestamp,
        utc_offset: FixedOffset,
        cancel: CancellationToken,
    ) -> Self {
        let span = tracing::info_span!(
            "pipeline_run",
            command = %payload.command,
            source_reference = %payload.source_reference,
            safe_title = tracing::field::Empty,
        );
        Self {
            payload,
            started_at,
            utc_offset,
            safe_title: OnceLock::new(),
            cancel,
            span,
        }
    }

    pub fn payload(&self) -> &TaskPayload {
        self.payload
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Resolve the run's safe title from `title`.
    ///
    /// The first call fixes the value; later calls return it unchanged
    /// whatever title they pass. With an idempotency key on the payload the
    /// value is stable across redeliveries, otherwise it is salted with the
    /// start time.
    pub fn safe_title(&self, title: &str) -> &str {
        self.safe_title.get_or_init(|| {
            let resolved = match self.payload.idempotency_key() {
                Some(key) => safe_title::resolve_keyed(title, key),
                None => safe_title::resolve(title, self.started_at, self.utc_offset),
            };
            self.span.record("safe_title", resolved.as_str());
            resolved
        })
    }

    /// The safe title, if one has been resolved.
    pub fn resolved_safe_title(&self) -> Option<&str> {
        self.safe_title.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mangaka_core::safe_title::default_offset;

    use super::*;

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn safe_title_is_memoised() {
        let payload = TaskPayload::new("generate");
        let ctx = ExecutionContext::new(&payload, start(), default_offset(), Default::default());

        assert!(ctx.resolved_safe_title().is_none());
        let first = ctx.safe_title("Zunda Quest").to_owned();
        let second = ctx.safe_title("Another Title").to_owned();

        assert_eq!(first, second);
        assert_eq!(ctx.resolved_safe_title(), Some(first.as_str()));
    }

    #[test]
    fn contexts_with_identical_inputs_agree() {
        let payload = TaskPayload::new("generate");
        let a = ExecutionContext::new(&payload, start(), default_offset(), Default::default());
        let b = ExecutionContext::new(&payload, start(), default_offset(), Default::default());
        assert_eq!(a.safe_title("T"), b.safe_title("T"));
    }

    #[test]
    fn contexts_started_at_different_nanos_differ() {
        let payload = TaskPayload::new("generate");
        let later = start() + chrono::Duration::nanoseconds(1);
        let a = ExecutionContext::new(&payload, start(), default_offset(), Default::default());
        let b = ExecutionContext::new(&payload, later, default_offset(), Default::default());
        assert_ne!(a.safe_title("T"), b.safe_title("T"));
    }

    #[test]
    fn idempotency_key_ignores_start_time() {
        let payload = TaskPayload {
            idempotency_key: Some("task-9".into()),
            ..TaskPayload::new("generate")
        };
        let later = start() + chrono::Duration::seconds(90);
        let a = ExecutionContext::new(&payload, start(), default_offset(), Default::default());
        let b = ExecutionContext::new(&payload, later, default_offset(), Default::default());

        assert_eq!(a.safe_title("T"), b.safe_title("T"));
        assert!(a.safe_title("T").starts_with("idem_"));
    }
}
