pub mod health;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /tasks/execute          run a queued task (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/tasks", tasks::router())
}
