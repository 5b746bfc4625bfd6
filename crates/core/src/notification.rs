//! Structured summaries of a run's outcome, sent to the notifier.

use serde::{Deserialize, Serialize};

/// Placeholder URL for outputs that have no browsable viewer page.
pub const NOT_APPLICABLE: &str = "N/A";

/// Source reference reported for design runs, which have no source content.
pub const DESIGN_SOURCE: &str = "N/A (Design)";

/// Execution mode reported for script-only runs.
pub const SCRIPT_ONLY_MODE: &str = "script-only";

/// Title hint used when a failed run produced no title and had no source.
pub const FALLBACK_TITLE: &str = "(untitled run)";

// ---------------------------------------------------------------------------
// OutputCategory
// ---------------------------------------------------------------------------

/// What kind of output a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputCategory {
    MangaOutput,
    ScriptJson,
    DesignSheet,
    ErrorReport,
}

impl OutputCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MangaOutput => "manga-output",
            Self::ScriptJson => "script-json",
            Self::DesignSheet => "design-sheet",
            Self::ErrorReport => "error-report",
        }
    }
}

impl std::fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationRequest
// ---------------------------------------------------------------------------

/// One run's outcome summary. Built, sent, and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub source_reference: String,
    pub output_category: OutputCategory,
    pub target_title: String,
    pub execution_mode: String,
}

/// `"<command>"` or `"<command> / <mode>"` when a mode override was given.
pub fn execution_mode(command: &str, mode: Option<&str>) -> String {
    match mode.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mode) => format!("{command} / {mode}"),
        None => command.to_owned(),
    }
}
