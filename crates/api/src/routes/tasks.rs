use axum::routing::post;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
pub fn router() -> Router<AppState> {
    Router::new().route("/execute", post(tasks::execute_task))
}
