use std::sync::Arc;

use mangaka_pipeline::Orchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The pipeline orchestrator; shared by all concurrent deliveries.
    pub orchestrator: Arc<Orchestrator>,
}
