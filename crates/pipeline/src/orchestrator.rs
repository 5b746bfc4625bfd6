//! The pipeline orchestrator.
//!
//! [`Orchestrator::execute`] runs one task delivery end to end:
//!
//! 1. build an [`ExecutionContext`] (start time, memoised safe title, span);
//! 2. interpret the payload into a [`Command`] and run its phase sequence;
//! 3. send exactly one notification: success on `Ok`, error report on `Err`.
//!
//! | command    | phases                                   |
//! |------------|------------------------------------------|
//! | `generate` | script → panel → publish → page          |
//! | `design`   | design                                   |
//! | `script`   | script (then the script JSON is stored)  |
//! | `panel`    | panel → publish                          |
//! | `page`     | page → publish                           |
//!
//! Phase failures are wrapped with the step name and abort the run. Retry
//! is left to the queue, which redelivers the whole task.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use mangaka_core::manga::{MangaResponse, PublishResult};
use mangaka_core::paths;
use mangaka_core::payload::{Command, TaskPayload};
use mangaka_events::Notifier;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::PipelineConfig;
use crate::context::{Clock, ExecutionContext, SystemClock};
use crate::error::{BoxError, PipelineError};
use crate::notify;
use crate::outcome::{RunFailure, RunOutcome, RunReport};
use crate::phases::{PhaseContext, Phases};
use crate::store::ArtifactStore;

// ---------------------------------------------------------------------------
// Step names and artifact file names
// ---------------------------------------------------------------------------

pub const STEP_SCRIPT: &str = "script";
pub const STEP_PANEL: &str = "panel generation";
pub const STEP_PUBLISH: &str = "publish";
pub const STEP_PAGE: &str = "page generation";
pub const STEP_DESIGN: &str = "design";
pub const STEP_PERSIST: &str = "script persistence";

/// File the script-only workflow writes under the run's output location.
pub const SCRIPT_FILE_NAME: &str = "manga_script.json";

/// Plot file the page phase renders from when no publish result is at hand.
pub const PLOT_FILE_NAME: &str = "manga_plot.md";

/// Directory under the storage root that holds design sheets.
pub const DESIGN_DIR: &str = "designs";

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Maps task payloads to phase sequences and reports their outcome.
///
/// Stateless between runs; share it behind an `Arc` across concurrent
/// deliveries.
pub struct Orchestrator {
    phases: Phases,
    store: Arc<dyn ArtifactStore>,
    notifier: Arc<dyn Notifier>,
    config: PipelineConfig,
    clock: Arc<dyn Clock>,
}

impl Orchestrator {
    pub fn new(
        phases: Phases,
        store: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            phases,
            store,
            notifier,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for run start times.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Execute one delivery of `payload`.
    ///
    /// Exactly one notification is sent per call. Notification failures are
    /// logged and never change the returned result.
    pub async fn execute(
        &self,
        payload: &TaskPayload,
        cancel: CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let ctx = ExecutionContext::new(payload, self.clock.now(), self.config.utc_offset, cancel);
        let span = ctx.span().clone();

        async {
            tracing::info!("Pipeline run started");
            let started = Instant::now();

            match self.run(&ctx).await {
                Ok(outcome) => {
                    let notification = notify::success(&ctx, &self.config, &outcome);
                    tracing::info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        category = %notification.request.output_category,
                        storage_uri = %notification.storage_uri,
                        "Pipeline run completed",
                    );

                    if let Err(e) = self
                        .notifier
                        .notify(
                            &notification.public_url,
                            &notification.storage_uri,
                            &notification.request,
                        )
                        .await
                    {
                        tracing::warn!(error = %e, "Failed to send success notification");
                    }

                    Ok(RunReport {
                        safe_title: ctx.resolved_safe_title().map(str::to_owned),
                        public_url: notification.public_url,
                        storage_uri: notification.storage_uri,
                        category: notification.request.output_category,
                    })
                }
                Err(failure) => {
                    tracing::error!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        error = %failure.error,
                        retryable = failure.error.is_retryable(),
                        "Pipeline run failed",
                    );

                    let request = notify::failure(&ctx, &failure);
                    if let Err(e) = self.notifier.notify_error(&failure.error, &request).await {
                        tracing::warn!(error = %e, "Failed to send error notification");
                    }

                    Err(failure.error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Interpret the payload and run its phase sequence.
    async fn run(&self, ctx: &ExecutionContext<'_>) -> Result<RunOutcome, RunFailure> {
        let command = Command::from_payload(ctx.payload()).map_err(RunFailure::untitled)?;
        tracing::debug!(command = command.name(), "Command dispatched");
        let mut phase_ctx = PhaseContext {
            cancel: ctx.cancel_token().clone(),
            ..PhaseContext::default()
        };

        match command {
            Command::Generate {
                source_reference,
                mode,
                panels,
            } => {
                phase_ctx.panels = panels;
                let manga = self
                    .script(ctx, &phase_ctx, &source_reference, mode.as_deref())
                    .await?;
                let output_location = self.output_location(ctx, &manga.title);
                let (manga, publish) = self
                    .draw_and_publish(ctx, &phase_ctx, manga, &output_location)
                    .await?;

                let page_paths = self
                    .step(
                        ctx,
                        STEP_PAGE,
                        self.phases
                            .page
                            .run_and_save(&phase_ctx, &manga, &publish.markdown_path),
                    )
                    .await
                    .map_err(RunFailure::titled(&manga.title))?;

                Ok(RunOutcome::Manga {
                    manga,
                    publish,
                    page_paths,
                })
            }
            Command::Design { identifiers, seed } => {
                let title = format!("design-{}", identifiers.join("-"));
                let output_location = paths::join(
                    &self.config.storage_root,
                    &[DESIGN_DIR, ctx.safe_title(&title)],
                );
                let design = self
                    .step(
                        ctx,
                        STEP_DESIGN,
                        self.phases
                            .design
                            .run(&phase_ctx, &identifiers, seed, &output_location),
                    )
                    .await
                    .map_err(RunFailure::untitled)?;

                Ok(RunOutcome::Design {
                    identifiers,
                    seed: design.seed,
                    output_url: design.output_url,
                })
            }
            Command::Script {
                source_reference,
                mode,
            } => {
                let manga = self
                    .script(ctx, &phase_ctx, &source_reference, mode.as_deref())
                    .await?;
                let artifact_path = self
                    .persist_script(ctx, &manga)
                    .await
                    .map_err(RunFailure::titled(&manga.title))?;

                Ok(RunOutcome::Script {
                    manga,
                    artifact_path,
                })
            }
            Command::Panel { manga, panels } => {
                phase_ctx.panels = panels;
                let output_location = self.output_location(ctx, &manga.title);
                let (manga, publish) = self
                    .draw_and_publish(ctx, &phase_ctx, manga, &output_location)
                    .await?;

                Ok(RunOutcome::Manga {
                    manga,
                    publish,
                    page_paths: Vec::new(),
                })
            }
            Command::Page { manga } => {
                let output_location = self.output_location(ctx, &manga.title);
                let plot_path = paths::join(&output_location, &[PLOT_FILE_NAME]);

                let page_paths = self
                    .step(
                        ctx,
                        STEP_PAGE,
                        self.phases.page.run_and_save(&phase_ctx, &manga, &plot_path),
                    )
                    .await
                    .map_err(RunFailure::titled(&manga.title))?;
                let publish = self
                    .step(
                        ctx,
                        STEP_PUBLISH,
                        self.phases.publish.run(&phase_ctx, &manga, &output_location),
                    )
                    .await
                    .map_err(RunFailure::titled(&manga.title))?;

                Ok(RunOutcome::Manga {
                    manga,
                    publish,
                    page_paths,
                })
            }
        }
    }

    /// Script phase; the only step that can fail before a title exists.
    async fn script(
        &self,
        ctx: &ExecutionContext<'_>,
        phase_ctx: &PhaseContext,
        source_reference: &str,
        mode: Option<&str>,
    ) -> Result<MangaResponse, RunFailure> {
        let manga = self
            .step(
                ctx,
                STEP_SCRIPT,
                self.phases.script.run(phase_ctx, source_reference, mode),
            )
            .await
            .map_err(RunFailure::untitled)?;

        tracing::info!(
            title = %manga.title,
            pages = manga.pages.len(),
            panels = manga.panel_count(),
            "Script generated",
        );
        Ok(manga)
    }

    /// Draw panels, then assemble a publishable artifact. Shared by
    /// `generate` and `panel`.
    async fn draw_and_publish(
        &self,
        ctx: &ExecutionContext<'_>,
        phase_ctx: &PhaseContext,
        manga: MangaResponse,
        output_location: &str,
    ) -> Result<(MangaResponse, PublishResult), RunFailure> {
        let title = manga.title.clone();
        let manga = self
            .step(
                ctx,
                STEP_PANEL,
                self.phases.panel.run_and_save(phase_ctx, manga, output_location),
            )
            .await
            .map_err(RunFailure::titled(&title))?;

        tracing::info!(
            rendered = manga.rendered_panel_count(),
            panels = manga.panel_count(),
            "Panels drawn",
        );

        let publish = self
            .step(
                ctx,
                STEP_PUBLISH,
                self.phases.publish.run(phase_ctx, &manga, output_location),
            )
            .await
            .map_err(RunFailure::titled(&manga.title))?;

        Ok((manga, publish))
    }

    /// Serialise the script and write it under the run's output location.
    async fn persist_script(
        &self,
        ctx: &ExecutionContext<'_>,
        manga: &MangaResponse,
    ) -> Result<String, PipelineError> {
        let bytes = serde_json::to_vec_pretty(manga)?;
        let path = paths::join(&self.output_location(ctx, &manga.title), &[SCRIPT_FILE_NAME]);

        let write = async {
            self.store
                .write(&path, bytes, "application/json")
                .await
                .map_err(|source| PipelineError::Storage {
                    path: path.clone(),
                    source,
                })
        };
        self.guarded(ctx, STEP_PERSIST, write).await?;

        tracing::info!(path = %path, "Script persisted");
        Ok(path)
    }

    /// `<storage root>/<safe title>`.
    fn output_location(&self, ctx: &ExecutionContext<'_>, title: &str) -> String {
        paths::join(&self.config.storage_root, &[ctx.safe_title(title)])
    }

    /// Run one phase call, racing it against cancellation and naming the
    /// step in any error.
    async fn step<T, F>(
        &self,
        ctx: &ExecutionContext<'_>,
        step: &'static str,
        call: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, BoxError>>,
    {
        let call = async move { call.await.map_err(|source| PipelineError::Phase { step, source }) };
        self.guarded(ctx, step, call).await
    }

    /// Race `call` against the run's cancellation token.
    async fn guarded<T, F>(
        &self,
        ctx: &ExecutionContext<'_>,
        step: &'static str,
        call: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        let cancel = ctx.cancel_token();
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { step });
        }

        tracing::debug!(step, "Phase started");
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PipelineError::Cancelled { step }),
            result = call => result,
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::debug!(step, elapsed_ms, "Phase finished"),
            Err(e) => tracing::warn!(step, elapsed_ms, error = %e, "Phase failed"),
        }
        result
    }
}
