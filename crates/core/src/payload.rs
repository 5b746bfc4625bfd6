//! Task payloads delivered by the work queue, and the closed [`Command`]
//! type they are interpreted into.
//!
//! [`Command::from_payload`] is the only place the raw `command` string is
//! matched. Each variant carries exactly the inputs its workflow consumes,
//! so downstream code dispatches with an exhaustive `match`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::manga::MangaResponse;

// ---------------------------------------------------------------------------
// Command names
// ---------------------------------------------------------------------------

pub const COMMAND_GENERATE: &str = "generate";
pub const COMMAND_DESIGN: &str = "design";
pub const COMMAND_SCRIPT: &str = "script";
pub const COMMAND_PANEL: &str = "panel";
pub const COMMAND_PAGE: &str = "page";

/// All recognised command names.
pub const VALID_COMMANDS: &[&str] = &[
    COMMAND_GENERATE,
    COMMAND_DESIGN,
    COMMAND_SCRIPT,
    COMMAND_PANEL,
    COMMAND_PAGE,
];

// ---------------------------------------------------------------------------
// TaskPayload
// ---------------------------------------------------------------------------

/// The unit of work delivered by the queue. Immutable for one execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub command: String,

    /// URL or free text identifying the source content.
    #[serde(default)]
    pub source_reference: String,

    /// Raw text or a serialised intermediate result; meaning depends on
    /// the command.
    #[serde(default)]
    pub input_text: String,

    /// Override of the generation model/variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    /// Comma-separated panel indices to (re)draw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_panels: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Supplied at enqueue time; makes the output location stable across
    /// redeliveries of the same logical request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl TaskPayload {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// The mode override, ignoring blank values.
    pub fn mode(&self) -> Option<&str> {
        non_blank(self.mode.as_deref())
    }

    /// The idempotency key, ignoring blank values.
    pub fn idempotency_key(&self) -> Option<&str> {
        non_blank(self.idempotency_key.as_deref())
    }

    /// The source reference, or `None` when blank.
    pub fn source_reference(&self) -> Option<&str> {
        non_blank(Some(self.source_reference.as_str()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Options for the panel-drawing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelOptions {
    /// Sorted, de-duplicated panel indices; `None` draws every panel.
    pub target_panels: Option<Vec<u32>>,
    pub seed: Option<i64>,
}

/// One supported workflow, with the inputs it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Script, then panels and publish, then pages.
    Generate {
        source_reference: String,
        mode: Option<String>,
        panels: PanelOptions,
    },
    /// Character design sheet.
    Design { identifiers: Vec<String>, seed: i64 },
    /// Script only, persisted as JSON.
    Script {
        source_reference: String,
        mode: Option<String>,
    },
    /// Panels and publish for an existing script.
    Panel {
        manga: MangaResponse,
        panels: PanelOptions,
    },
    /// Pages, then publish, for an existing script.
    Page { manga: MangaResponse },
}

impl Command {
    /// Interpret a payload, validating the inputs its command requires.
    pub fn from_payload(payload: &TaskPayload) -> Result<Self, CoreError> {
        let mode = payload.mode().map(str::to_owned);

        match payload.command.trim() {
            COMMAND_GENERATE => Ok(Self::Generate {
                source_reference: payload.source_reference.clone(),
                mode,
                panels: panel_options(payload, COMMAND_GENERATE)?,
            }),
            COMMAND_DESIGN => {
                let identifiers = parse_identifiers(&payload.input_text);
                if identifiers.is_empty() {
                    return Err(CoreError::InvalidInput {
                        command: COMMAND_DESIGN,
                        reason: "input_text must list at least one identifier".into(),
                    });
                }
                Ok(Self::Design {
                    identifiers,
                    seed: payload.seed.unwrap_or(0),
                })
            }
            COMMAND_SCRIPT => Ok(Self::Script {
                source_reference: payload.source_reference.clone(),
                mode,
            }),
            COMMAND_PANEL => {
                let manga = serde_json::from_str::<MangaResponse>(&payload.input_text).map_err(
                    |e| CoreError::InvalidInput {
                        command: COMMAND_PANEL,
                        reason: format!("input_text is not a valid manga response: {e}"),
                    },
                )?;
                Ok(Self::Panel {
                    manga,
                    panels: panel_options(payload, COMMAND_PANEL)?,
                })
            }
            COMMAND_PAGE => Ok(Self::Page {
                manga: decode_required_manga(&payload.input_text, COMMAND_PAGE)?,
            }),
            _ => Err(CoreError::UnsupportedCommand(payload.command.clone())),
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => COMMAND_GENERATE,
            Self::Design { .. } => COMMAND_DESIGN,
            Self::Script { .. } => COMMAND_SCRIPT,
            Self::Panel { .. } => COMMAND_PANEL,
            Self::Page { .. } => COMMAND_PAGE,
        }
    }
}

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// Split a comma-separated identifier list, trimming whitespace and dropping
/// empty entries. Order is preserved.
pub fn parse_identifiers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a comma-separated panel index filter.
///
/// Blank input means "no filter" (`Ok(None)`). Indices are returned sorted
/// and de-duplicated.
pub fn parse_panel_filter(input: &str) -> Result<Option<Vec<u32>>, String> {
    let mut indices = Vec::new();
    for part in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let index = part
            .parse::<u32>()
            .map_err(|_| format!("'{part}' is not a panel index"))?;
        indices.push(index);
    }

    if indices.is_empty() {
        return Ok(None);
    }
    indices.sort_unstable();
    indices.dedup();
    Ok(Some(indices))
}

fn panel_options(payload: &TaskPayload, command: &'static str) -> Result<PanelOptions, CoreError> {
    let target_panels = match payload.target_panels.as_deref() {
        Some(raw) => parse_panel_filter(raw).map_err(|reason| CoreError::InvalidInput {
            command,
            reason: format!("target_panels: {reason}"),
        })?,
        None => None,
    };
    Ok(PanelOptions {
        target_panels,
        seed: payload.seed,
    })
}

/// Decode an optional manga response and insist that one is present.
fn decode_required_manga(input: &str, command: &'static str) -> Result<MangaResponse, CoreError> {
    if input.trim().is_empty() {
        return Err(CoreError::InvalidInput {
            command,
            reason: "input_text must contain a manga response".into(),
        });
    }

    let decoded = serde_json::from_str::<Option<MangaResponse>>(input).map_err(|e| {
        CoreError::InvalidInput {
            command,
            reason: format!("input_text is not a valid manga response: {e}"),
        }
    })?;

    decoded.ok_or_else(|| CoreError::InvalidInput {
        command,
        reason: "input_text decoded to a null manga response".into(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
