//! HTTP client for the generation service endpoints.
//!
//! Every phase is a `POST` with a JSON body and a JSON response:
//!
//! | phase   | endpoint   | response              |
//! |---------|------------|-----------------------|
//! | script  | `/script`  | manga response        |
//! | panel   | `/panels`  | manga response        |
//! | publish | `/publish` | publish result        |
//! | page    | `/pages`   | `{ "page_paths": [] }`|
//! | design  | `/design`  | `{ "output_url", "seed" }` |

use std::time::Duration;

use async_trait::async_trait;
use mangaka_core::manga::{MangaResponse, PublishResult};
use mangaka_pipeline::{
    BoxError, DesignOutput, DesignRunner, PageImageRunner, PanelImageRunner, PhaseContext,
    PublishRunner, ScriptRunner,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Generation calls render images and can take many minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(900);

/// Longest response body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the generation REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("generation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ScriptRequest<'a> {
    source_reference: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
}

#[derive(Serialize)]
struct PanelRequest<'a> {
    manga: &'a MangaResponse,
    output_location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_panels: Option<&'a [u32]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
}

#[derive(Serialize)]
struct PublishRequest<'a> {
    manga: &'a MangaResponse,
    output_location: &'a str,
}

#[derive(Serialize)]
struct PageRequest<'a> {
    manga: &'a MangaResponse,
    plot_path: &'a str,
}

#[derive(Deserialize)]
struct PageResponse {
    page_paths: Vec<String>,
}

#[derive(Serialize)]
struct DesignRequest<'a> {
    identifiers: &'a [String],
    seed: i64,
    output_location: &'a str,
}

#[derive(Deserialize)]
struct DesignResponse {
    output_url: String,
    seed: i64,
}

// ---------------------------------------------------------------------------
// GenerationApi
// ---------------------------------------------------------------------------

/// HTTP client for one generation service instance.
#[derive(Clone)]
pub struct GenerationApi {
    client: reqwest::Client,
    api_url: String,
}

impl GenerationApi {
    /// Create a client for `api_url` (e.g. `http://host:8000`).
    pub fn new(api_url: impl Into<String>) -> Result<Self, GenerationApiError> {
        Self::with_timeout(api_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Load the client from the environment.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `GENERATION_API_URL`      | `http://localhost:8000` |
    /// | `GENERATION_TIMEOUT_SECS` | `900`                   |
    pub fn from_env() -> Result<Self, GenerationApiError> {
        let api_url =
            std::env::var("GENERATION_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        let timeout = std::env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self::with_timeout(api_url, timeout)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// POST `body` to `path` and decode the JSON response.
    async fn post<B, R>(&self, endpoint: &'static str, body: &B) -> Result<R, GenerationApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        tracing::debug!(endpoint, url = %self.api_url, "Calling generation API");

        let response = self
            .client
            .post(self.endpoint(endpoint))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationApiError::ApiError {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|source| GenerationApiError::Decode { endpoint, source })
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Phase implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl ScriptRunner for GenerationApi {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        source_reference: &str,
        mode: Option<&str>,
    ) -> Result<MangaResponse, BoxError> {
        let body = ScriptRequest {
            source_reference,
            mode,
        };
        Ok(self.post("script", &body).await?)
    }
}

#[async_trait]
impl PanelImageRunner for GenerationApi {
    async fn run_and_save(
        &self,
        ctx: &PhaseContext,
        manga: MangaResponse,
        output_location: &str,
    ) -> Result<MangaResponse, BoxError> {
        let body = PanelRequest {
            manga: &manga,
            output_location,
            target_panels: ctx.panels.target_panels.as_deref(),
            seed: ctx.panels.seed,
        };
        Ok(self.post("panels", &body).await?)
    }
}

#[async_trait]
impl PublishRunner for GenerationApi {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        manga: &MangaResponse,
        output_location: &str,
    ) -> Result<PublishResult, BoxError> {
        let body = PublishRequest {
            manga,
            output_location,
        };
        Ok(self.post("publish", &body).await?)
    }
}

#[async_trait]
impl PageImageRunner for GenerationApi {
    async fn run_and_save(
        &self,
        _ctx: &PhaseContext,
        manga: &MangaResponse,
        plot_path: &str,
    ) -> Result<Vec<String>, BoxError> {
        let body = PageRequest { manga, plot_path };
        let response: PageResponse = self.post("pages", &body).await?;
        Ok(response.page_paths)
    }
}

#[async_trait]
impl DesignRunner for GenerationApi {
    async fn run(
        &self,
        _ctx: &PhaseContext,
        identifiers: &[String],
        seed: i64,
        output_location: &str,
    ) -> Result<DesignOutput, BoxError> {
        let body = DesignRequest {
            identifiers,
            seed,
            output_location,
        };
        let response: DesignResponse = self.post("design", &body).await?;
        Ok(DesignOutput {
            output_url: response.output_url,
            seed: response.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
