//! Builds the notification for a run from its context and outcome.

use mangaka_core::notification::{
    execution_mode, NotificationRequest, OutputCategory, DESIGN_SOURCE, FALLBACK_TITLE,
    NOT_APPLICABLE, SCRIPT_ONLY_MODE,
};
use mangaka_core::paths;

use crate::config::PipelineConfig;
use crate::context::ExecutionContext;
use crate::outcome::{RunFailure, RunOutcome};

/// A success notification ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessNotification {
    pub request: NotificationRequest,
    pub public_url: String,
    pub storage_uri: String,
}

/// Build the success notification for `outcome`.
pub fn success(
    ctx: &ExecutionContext<'_>,
    config: &PipelineConfig,
    outcome: &RunOutcome,
) -> SuccessNotification {
    let payload = ctx.payload();

    match outcome {
        RunOutcome::Manga { manga, .. } => {
            let safe_title = ctx.safe_title(&manga.title);
            SuccessNotification {
                request: NotificationRequest {
                    source_reference: payload.source_reference.clone(),
                    output_category: OutputCategory::MangaOutput,
                    target_title: manga.title.clone(),
                    execution_mode: execution_mode(&payload.command, payload.mode()),
                },
                public_url: paths::join(&config.service_url, &[&config.output_dir, safe_title]),
                storage_uri: paths::join(&config.storage_root, &[safe_title]),
            }
        }
        RunOutcome::Script {
            manga,
            artifact_path,
        } => SuccessNotification {
            request: NotificationRequest {
                source_reference: payload.source_reference.clone(),
                output_category: OutputCategory::ScriptJson,
                target_title: manga.title.clone(),
                execution_mode: SCRIPT_ONLY_MODE.to_owned(),
            },
            public_url: NOT_APPLICABLE.to_owned(),
            storage_uri: artifact_path.clone(),
        },
        RunOutcome::Design {
            identifiers,
            seed,
            output_url,
        } => SuccessNotification {
            request: NotificationRequest {
                source_reference: DESIGN_SOURCE.to_owned(),
                output_category: OutputCategory::DesignSheet,
                target_title: format!("Design: {} (Seed: {seed})", identifiers.join(", ")),
                execution_mode: execution_mode(&payload.command, payload.mode()),
            },
            public_url: NOT_APPLICABLE.to_owned(),
            storage_uri: output_url.clone(),
        },
    }
}

/// Build the error-report request for a failed run.
///
/// The title is the manga title known at failure time, else the source
/// reference, else a fixed fallback. The execution mode is the raw command
/// string, recognised or not.
pub fn failure(ctx: &ExecutionContext<'_>, failure: &RunFailure) -> NotificationRequest {
    let payload = ctx.payload();
    let target_title = failure
        .title_hint
        .clone()
        .or_else(|| payload.source_reference().map(str::to_owned))
        .unwrap_or_else(|| FALLBACK_TITLE.to_owned());

    NotificationRequest {
        source_reference: payload.source_reference.clone(),
        output_category: OutputCategory::ErrorReport,
        target_title,
        execution_mode: payload.command.clone(),
    }
}
