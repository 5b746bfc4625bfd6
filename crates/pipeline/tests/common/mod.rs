//! Recording fakes for the orchestrator's collaborators.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mangaka_core::manga::{MangaPage, MangaPanel, MangaResponse, PublishResult};
use mangaka_core::notification::NotificationRequest;
use mangaka_core::safe_title::default_offset;
use mangaka_core::types::Timestamp;
use mangaka_events::{Notifier, NotifyError};
use mangaka_pipeline::context::Clock;
use mangaka_pipeline::{
    ArtifactStore, BoxError, DesignOutput, DesignRunner, Orchestrator, PageImageRunner,
    PanelImageRunner, PhaseContext, Phases, PipelineConfig, PublishRunner, ScriptRunner,
};

pub const SCRIPT_TITLE: &str = "Zunda Quest";

// ---------------------------------------------------------------------------
// Phase fake
// ---------------------------------------------------------------------------

/// One recorded phase invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCall {
    pub step: &'static str,
    pub detail: String,
}

/// Implements every phase, recording calls in order.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: Mutex<Vec<PhaseCall>>,
    /// Step name (`"script"`, `"panel"`, ...) that should return an error.
    pub fail_step: Option<&'static str>,
    /// Step name that never completes.
    pub hang_step: Option<&'static str>,
    /// Step name that cancels the run's token just before it succeeds.
    pub cancel_after_step: Option<&'static str>,
}

impl FakeGenerator {
    pub fn failing(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::default()
        }
    }

    pub fn hanging(step: &'static str) -> Self {
        Self {
            hang_step: Some(step),
            ..Self::default()
        }
    }

    pub fn cancelling_after(step: &'static str) -> Self {
        Self {
            cancel_after_step: Some(step),
            ..Self::default()
        }
    }

    pub fn steps(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.step).collect()
    }

    pub fn calls(&self) -> Vec<PhaseCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, step: &'static str, detail: String) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push(PhaseCall { step, detail });
        if self.hang_step == Some(step) {
            std::future::pending::<()>().await;
        }
        if self.fail_step == Some(step) {
            return Err(format!("{step} collaborator exploded").into());
        }
        Ok(())
    }
}

pub fn sample_manga(title: &str) -> MangaResponse {
    let mut manga = MangaResponse::new(title);
    manga.pages = vec![MangaPage::new(
        1,
        vec![MangaPanel::new(1, "classroom"), MangaPanel::new(2, "rooftop")],
    )];
    manga
}

#[async_trait]
impl ScriptRunner for FakeGenerator {
    async fn run(
        &self,
        ctx: &PhaseContext,
        source_reference: &str,
        mode: Option<&str>,
    ) -> Result<MangaResponse, BoxError> {
        self.enter("script", format!("{source_reference}|{}", mode.unwrap_or("-")))
            .await?;
        if self.cancel_after_step == Some("script") {
            ctx.cancel.cancel();
        }
        Ok(sample_manga(SCRIPT_TITLE))
    }
}

#[async_trait]
impl PanelImageRunner for FakeGenerator {
    async fn run_and_save(
        &self,
        ctx: &PhaseContext,
        mut manga: MangaResponse,
        output_location: &str,
    ) -> Result<MangaResponse, BoxError> {
        self.enter(
            "panel",
            format!("{output_location}|{:?}", ctx.panels.target_panels),
        )
        .await?;
        for panel in manga.pages.iter_mut().flat_map(|p| p.panels.iter_mut()) {
            panel.image_path = Some(format!("{output_location}/panel_{}.png", panel.panel_number));
        }
        Ok(manga)
    }
}

#[async_trait]
impl PublishRunner for FakeGenerator {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        manga: &MangaResponse,
        output_location: &str,
    ) -> Result<PublishResult, BoxError> {
        self.enter(
            "publish",
            format!("{output_location}|{}", manga.rendered_panel_count()),
        )
        .await?;
        Ok(PublishResult {
            markdown_path: format!("{output_location}/published_plot.md"),
            html_path: Some(format!("{output_location}/index.html")),
        })
    }
}

#[async_trait]
impl PageImageRunner for FakeGenerator {
    async fn run_and_save(
        &self,
        _ctx: &PhaseContext,
        manga: &MangaResponse,
        plot_path: &str,
    ) -> Result<Vec<String>, BoxError> {
        self.enter("page", plot_path.to_owned()).await?;
        Ok(manga
            .pages
            .iter()
            .map(|p| format!("{plot_path}.page_{}.png", p.page_number))
            .collect())
    }
}

#[async_trait]
impl DesignRunner for FakeGenerator {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        identifiers: &[String],
        seed: i64,
        output_location: &str,
    ) -> Result<DesignOutput, BoxError> {
        self.enter(
            "design",
            format!("{}|{seed}|{output_location}", identifiers.join(",")),
        )
        .await?;
        Ok(DesignOutput {
            output_url: format!("{output_location}/design_sheet.png"),
            seed: if seed == 0 { 1234 } else { seed },
        })
    }
}

// ---------------------------------------------------------------------------
// Notifier fake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Success {
        public_url: String,
        storage_uri: String,
        request: NotificationRequest,
    },
    Error {
        error_text: String,
        request: NotificationRequest,
    },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        public_url: &str,
        storage_uri: &str,
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(Sent::Success {
            public_url: public_url.to_owned(),
            storage_uri: storage_uri.to_owned(),
            request: request.clone(),
        });
        if self.fail {
            return Err(NotifyError::HttpStatus(503));
        }
        Ok(())
    }

    async fn notify_error(
        &self,
        error: &(dyn std::error::Error + Send + Sync),
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(Sent::Error {
            error_text: error.to_string(),
            request: request.clone(),
        });
        if self.fail {
            return Err(NotifyError::HttpStatus(503));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store and clock fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    pub writes: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: bool,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn write(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), BoxError> {
        if self.fail {
            return Err("bucket unavailable".into());
        }
        self.writes.lock().unwrap().push((path.to_owned(), bytes));
        Ok(())
    }
}

pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        service_url: "https://manga.example.com".into(),
        output_dir: "outputs".into(),
        storage_root: "gs://bucket/manga".into(),
        utc_offset: default_offset(),
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub generator: Arc<FakeGenerator>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
}

pub fn harness(generator: FakeGenerator) -> Harness {
    harness_with(generator, RecordingNotifier::default(), MemoryStore::default())
}

pub fn harness_with(
    generator: FakeGenerator,
    notifier: RecordingNotifier,
    store: MemoryStore,
) -> Harness {
    let generator = Arc::new(generator);
    let notifier = Arc::new(notifier);
    let store = Arc::new(store);

    let orchestrator = Orchestrator::new(
        Phases::from_shared(generator.clone()),
        store.clone(),
        notifier.clone(),
        test_config(),
    )
    .with_clock(Arc::new(FixedClock(start_time())));

    Harness {
        orchestrator,
        generator,
        notifier,
        store,
    }
}

pub fn manga_json(title: &str) -> String {
    serde_json::to_string(&sample_manga(title)).unwrap()
}
