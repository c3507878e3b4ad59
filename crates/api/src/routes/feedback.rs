use axum::routing::post;
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Feedback routes — merged at the `/api/v1` root.
pub fn router() -> Router<AppState> {
    Router::new().route("/feedback", post(feedback::submit_feedback))
}
