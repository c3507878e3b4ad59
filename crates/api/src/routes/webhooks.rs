use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Provider callback routes — mounted at `/webhooks`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/telco/validation", post(webhooks::validation))
        .route("/telco/notification", post(webhooks::notification))
}
