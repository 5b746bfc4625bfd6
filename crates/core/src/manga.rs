//! Generation results passed between phases.
//!
//! These types are owned by the generation service; the orchestrator only
//! needs the title, the panel layout, and the per-panel image references.
//! Every struct keeps unknown fields in `extra` so a response decoded from a
//! task payload can be re-serialised without loss.

use serde::{Deserialize, Serialize};

/// A generated manga script, optionally with rendered panel images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaResponse {
    pub title: String,

    #[serde(default)]
    pub pages: Vec<MangaPage>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaPage {
    pub page_number: u32,

    #[serde(default)]
    pub panels: Vec<MangaPanel>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MangaPanel {
    pub panel_number: u32,

    #[serde(default)]
    pub scene: String,

    /// Storage location of the rendered panel; `None` until the panel phase
    /// has drawn it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MangaResponse {
    /// Create a response with a title and no pages.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Total number of panels across all pages.
    pub fn panel_count(&self) -> usize {
        self.pages.iter().map(|p| p.panels.len()).sum()
    }

    /// Number of panels that already carry an image reference.
    pub fn rendered_panel_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.panels.iter())
            .filter(|panel| panel.image_path.is_some())
            .count()
    }
}

impl MangaPage {
    pub fn new(page_number: u32, panels: Vec<MangaPanel>) -> Self {
        Self {
            page_number,
            panels,
            extra: serde_json::Map::new(),
        }
    }
}

impl MangaPanel {
    pub fn new(panel_number: u32, scene: impl Into<String>) -> Self {
        Self {
            panel_number,
            scene: scene.into(),
            image_path: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Locations of the artifacts written by the publish phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    /// The markdown plot file; the page phase renders from this.
    pub markdown_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_path: Option<String>,
}
