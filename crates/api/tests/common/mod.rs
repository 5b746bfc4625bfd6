#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use mangaka_core::manga::{MangaPage, MangaPanel, MangaResponse, PublishResult};
use mangaka_core::notification::NotificationRequest;
use mangaka_core::safe_title::default_offset;
use mangaka_events::{Notifier, NotifyError};
use mangaka_pipeline::{
    ArtifactStore, BoxError, DesignOutput, DesignRunner, Orchestrator, PageImageRunner,
    PanelImageRunner, PhaseContext, Phases, PipelineConfig, PublishRunner, ScriptRunner,
};
use tower::ServiceExt;

use mangaka_api::config::ServerConfig;
use mangaka_api::router::build_app_router;
use mangaka_api::state::AppState;

pub const SCRIPT_TITLE: &str = "Harbor Lights";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        json_logs: false,
    }
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        service_url: "https://manga.example.com".into(),
        output_dir: "outputs".into(),
        storage_root: "gs://bucket/manga".into(),
        utc_offset: default_offset(),
    }
}

// ---------------------------------------------------------------------------
// Collaborator stubs
// ---------------------------------------------------------------------------

/// Answers every phase immediately, or fails or stalls the script step
/// when asked.
#[derive(Default)]
pub struct StubGenerator {
    pub fail_script: bool,
    pub hang_script: bool,
}

fn stub_manga() -> MangaResponse {
    let mut manga = MangaResponse::new(SCRIPT_TITLE);
    manga.pages = vec![MangaPage::new(1, vec![MangaPanel::new(1, "pier at dusk")])];
    manga
}

#[async_trait]
impl ScriptRunner for StubGenerator {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        _source_reference: &str,
        _mode: Option<&str>,
    ) -> Result<MangaResponse, BoxError> {
        if self.hang_script {
            std::future::pending::<()>().await;
        }
        if self.fail_script {
            return Err("script service unavailable".into());
        }
        Ok(stub_manga())
    }
}

#[async_trait]
impl PanelImageRunner for StubGenerator {
    async fn run_and_save(
        &self,
        _ctx: &PhaseContext,
        manga: MangaResponse,
        _output_location: &str,
    ) -> Result<MangaResponse, BoxError> {
        Ok(manga)
    }
}

#[async_trait]
impl PublishRunner for StubGenerator {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        _manga: &MangaResponse,
        output_location: &str,
    ) -> Result<PublishResult, BoxError> {
        Ok(PublishResult {
            markdown_path: format!("{output_location}/manga_plot.md"),
            html_path: None,
        })
    }
}

#[async_trait]
impl PageImageRunner for StubGenerator {
    async fn run_and_save(
        &self,
        _ctx: &PhaseContext,
        _manga: &MangaResponse,
        plot_path: &str,
    ) -> Result<Vec<String>, BoxError> {
        Ok(vec![format!("{plot_path}.page_1.png")])
    }
}

#[async_trait]
impl DesignRunner for StubGenerator {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        _identifiers: &[String],
        seed: i64,
        output_location: &str,
    ) -> Result<DesignOutput, BoxError> {
        Ok(DesignOutput {
            output_url: format!("{output_location}/design_sheet.png"),
            seed,
        })
    }
}

/// Counts notifications by kind.
#[derive(Default)]
pub struct CountingNotifier {
    pub successes: Mutex<Vec<NotificationRequest>>,
    pub errors: Mutex<Vec<NotificationRequest>>,
}

impl CountingNotifier {
    pub fn counts(&self) -> (usize, usize) {
        (
            self.successes.lock().unwrap().len(),
            self.errors.lock().unwrap().len(),
        )
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn notify(
        &self,
        _public_url: &str,
        _storage_uri: &str,
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.successes.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn notify_error(
        &self,
        _error: &(dyn std::error::Error + Send + Sync),
        request: &NotificationRequest,
    ) -> Result<(), NotifyError> {
        self.errors.lock().unwrap().push(request.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct NullStore;

#[async_trait]
impl ArtifactStore for NullStore {
    async fn write(&self, _path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<CountingNotifier>,
}

/// Build the full application router with stub collaborators.
///
/// Uses the same `build_app_router` as `main.rs` so tests exercise the
/// production middleware stack.
pub fn build_test_app(generator: StubGenerator) -> TestApp {
    build_test_app_with_config(generator, test_config())
}

pub fn build_test_app_with_config(generator: StubGenerator, config: ServerConfig) -> TestApp {
    let notifier = Arc::new(CountingNotifier::default());
    let orchestrator = Orchestrator::new(
        Phases::from_shared(Arc::new(generator)),
        Arc::new(NullStore),
        notifier.clone(),
        pipeline_config(),
    );

    let state = AppState {
        config: Arc::new(config),
        orchestrator: Arc::new(orchestrator),
    };

    TestApp {
        router: build_app_router(state),
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a raw body. No `Content-Type` is set, matching queue deliveries
/// that omit it.
pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
