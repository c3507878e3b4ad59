use axum::routing::post;
use axum::Router;

use crate::handlers::rewards;
use crate::state::AppState;

/// Public reward routes — mounted at `/rewards`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/claim", post(rewards::claim_reward))
}
