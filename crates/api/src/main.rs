use std::net::SocketAddr;
use std::sync::Arc;

use mangaka_generation::GenerationApi;
use mangaka_pipeline::{LocalArtifactStore, Orchestrator, Phases, PipelineConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mangaka_api::config::ServerConfig;
use mangaka_api::router::build_app_router;
use mangaka_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();

    // --- Tracing ---
    init_tracing(config.json_logs);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        service_url = %pipeline_config.service_url,
        storage_root = %pipeline_config.storage_root,
        utc_offset = %pipeline_config.utc_offset,
        "Loaded pipeline configuration",
    );

    // --- Collaborators ---
    let generation =
        Arc::new(GenerationApi::from_env().expect("Failed to build generation API client"));
    tracing::info!(api_url = %generation.api_url(), "Generation API client created");

    let notifier = mangaka_events::notifier_from_env();

    let orchestrator = Orchestrator::new(
        Phases::from_shared(generation),
        Arc::new(LocalArtifactStore),
        notifier,
        pipeline_config,
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: Arc::new(orchestrator),
    };

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "mangaka_api=debug,mangaka_pipeline=debug,mangaka_events=info,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM. In-flight deliveries are allowed to finish;
/// the queue redelivers anything cut off by the process exiting.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
