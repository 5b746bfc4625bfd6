//! Pipeline orchestrator for mangaka content generation.
//!
//! Maps a task's command to an ordered sequence of phases, drives those
//! phases against external collaborators, derives the run's output
//! location, and reports the outcome through a [`mangaka_events::Notifier`].

pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod outcome;
pub mod phases;
pub mod store;

pub use config::PipelineConfig;
pub use error::{BoxError, PipelineError};
pub use orchestrator::Orchestrator;
pub use outcome::{RunFailure, RunOutcome, RunReport};
pub use phases::{
    DesignOutput, DesignRunner, PageImageRunner, PanelImageRunner, PhaseContext, Phases,
    PublishRunner, ScriptRunner,
};
pub use store::{ArtifactStore, LocalArtifactStore};
