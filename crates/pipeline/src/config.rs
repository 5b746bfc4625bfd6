use chrono::FixedOffset;
use mangaka_core::safe_title::{default_offset, parse_utc_offset};

/// Output-location configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Public root of the viewer service, e.g. `https://manga.example.com`.
    pub service_url: String,
    /// Path segment under `service_url` that serves run outputs.
    pub output_dir: String,
    /// Root under which every run writes `<safe title>/...`.
    pub storage_root: String,
    /// Offset used to render the safe-title timestamp.
    pub utc_offset: FixedOffset,
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `SERVICE_URL`           | `http://localhost:8080` |
    /// | `OUTPUT_DIR`            | `outputs`               |
    /// | `STORAGE_ROOT`          | `./output`              |
    /// | `SAFE_TITLE_UTC_OFFSET` | `+09:00`                |
    ///
    /// An unparseable offset falls back to `+09:00`.
    pub fn from_env() -> Self {
        let service_url =
            std::env::var("SERVICE_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        let output_dir = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "outputs".into());
        let storage_root = std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./output".into());
        let utc_offset = std::env::var("SAFE_TITLE_UTC_OFFSET")
            .map(|raw| parse_utc_offset(&raw))
            .unwrap_or_else(|_| default_offset());

        Self {
            service_url,
            output_dir,
            storage_root,
            utc_offset,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".into(),
            output_dir: "outputs".into(),
            storage_root: "./output".into(),
            utc_offset: default_offset(),
        }
    }
}
