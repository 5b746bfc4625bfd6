//! Phase collaborator interfaces.
//!
//! Each phase is an independent, stateless unit owned by the generation
//! service. The orchestrator holds them as `Arc<dyn _>` and threads each
//! phase's output into the next phase's input.

use std::sync::Arc;

use async_trait::async_trait;
use mangaka_core::manga::{MangaResponse, PublishResult};
use mangaka_core::payload::PanelOptions;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// Per-run values shared with every phase call.
#[derive(Debug, Clone, Default)]
pub struct PhaseContext {
    /// Cancelled when the inbound delivery is abandoned; long-running
    /// collaborators should observe it and return promptly.
    pub cancel: CancellationToken,
    /// Panel filter and seed for the panel phase.
    pub panels: PanelOptions,
}

/// Result of the design phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignOutput {
    /// Location of the rendered design sheet.
    pub output_url: String,
    /// The seed actually used (resolved when `0` was requested).
    pub seed: i64,
}

/// Synthesises a manga script from source content.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(
        &self,
        ctx: &PhaseContext,
        source_reference: &str,
        mode: Option<&str>,
    ) -> Result<MangaResponse, BoxError>;
}

/// Draws panel images and returns the response with `image_path`s filled in.
#[async_trait]
pub trait PanelImageRunner: Send + Sync {
    async fn run_and_save(
        &self,
        ctx: &PhaseContext,
        manga: MangaResponse,
        output_location: &str,
    ) -> Result<MangaResponse, BoxError>;
}

/// Assembles a publishable artifact (markdown plot, HTML) from a response.
#[async_trait]
pub trait PublishRunner: Send + Sync {
    async fn run(
        &self,
        ctx: &PhaseContext,
        manga: &MangaResponse,
        output_location: &str,
    ) -> Result<PublishResult, BoxError>;
}

/// Renders full pages from a published plot; returns the page image paths.
#[async_trait]
pub trait PageImageRunner: Send + Sync {
    async fn run_and_save(
        &self,
        ctx: &PhaseContext,
        manga: &MangaResponse,
        plot_path: &str,
    ) -> Result<Vec<String>, BoxError>;
}

/// Renders a character design sheet.
#[async_trait]
pub trait DesignRunner: Send + Sync {
    async fn run(
        &self,
        ctx: &PhaseContext,
        identifiers: &[String],
        seed: i64,
        output_location: &str,
    ) -> Result<DesignOutput, BoxError>;
}

/// The five phase collaborators, bundled for the orchestrator.
#[derive(Clone)]
pub struct Phases {
    pub script: Arc<dyn ScriptRunner>,
    pub panel: Arc<dyn PanelImageRunner>,
    pub publish: Arc<dyn PublishRunner>,
    pub page: Arc<dyn PageImageRunner>,
    pub design: Arc<dyn DesignRunner>,
}

impl Phases {
    /// Use one value that implements every phase (e.g. an HTTP client for
    /// the generation service).
    pub fn from_shared<T>(runner: Arc<T>) -> Self
    where
        T: ScriptRunner
            + PanelImageRunner
            + PublishRunner
            + PageImageRunner
            + DesignRunner
            + 'static,
    {
        Self {
            script: runner.clone(),
            panel: runner.clone(),
            publish: runner.clone(),
            page: runner.clone(),
            design: runner,
        }
    }
}
