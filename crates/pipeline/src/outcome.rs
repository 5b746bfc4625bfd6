//! Immutable records of how a run ended.

use mangaka_core::manga::{MangaResponse, PublishResult};
use mangaka_core::notification::OutputCategory;

use crate::error::PipelineError;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// `generate`, `panel` and `page`: a published manga.
    Manga {
        manga: MangaResponse,
        publish: PublishResult,
        page_paths: Vec<String>,
    },
    /// `script`: the persisted script JSON.
    Script {
        manga: MangaResponse,
        artifact_path: String,
    },
    /// `design`: a rendered design sheet.
    Design {
        identifiers: Vec<String>,
        seed: i64,
        output_url: String,
    },
}

/// A failed run: the error plus the best title known when it failed.
#[derive(Debug)]
pub struct RunFailure {
    pub error: PipelineError,
    /// Title of the manga response in hand at failure time, if any.
    pub title_hint: Option<String>,
}

impl RunFailure {
    /// Failure before any manga response existed.
    pub fn untitled(error: impl Into<PipelineError>) -> Self {
        Self {
            error: error.into(),
            title_hint: None,
        }
    }

    /// Failure while a manga response titled `title` was in hand.
    pub fn titled(title: &str) -> impl FnOnce(PipelineError) -> Self + '_ {
        move |error| Self {
            error,
            title_hint: Some(title.to_owned()).filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Summary returned to the caller of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    pub safe_title: Option<String>,
    pub public_url: String,
    pub storage_uri: String,
    pub category: OutputCategory,
}
