//! Admin route tree — mounted at `/admin`, every handler gated by
//! [`AdminAuth`](crate::middleware::admin::AdminAuth).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{qr, rewards, skus};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/skus", post(skus::create_sku))
        .route("/skus/{id}", get(skus::get_sku))
        .route("/qr/batches", post(qr::create_batch))
        .route("/qr/batches/{batch_number}", get(qr::batch_status))
        .route("/rewards", get(rewards::list_rewards))
        .route("/rewards/sweep", post(rewards::sweep_rewards))
        .route("/rewards/{id}", get(rewards::get_reward))
        .route("/rewards/{id}/process", post(rewards::process_reward))
}
