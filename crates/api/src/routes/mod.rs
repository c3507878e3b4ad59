pub mod admin;
pub mod feedback;
pub mod health;
pub mod qr;
pub mod rewards;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /feedback                                 submit feedback (public)
///
/// /qr/{id}                                  validate token (public)
///
/// /rewards/{id}/claim                       claim a sent reward (public)
///
/// /webhooks/telco/validation                provider pre-send check
/// /webhooks/telco/notification              provider delivery status
///
/// /admin/skus                               create SKU (admin only)
/// /admin/skus/{id}                          get SKU
/// /admin/qr/batches                         generate QR batch
/// /admin/qr/batches/{batch_number}          unused-token count
/// /admin/rewards                            list rewards
/// /admin/rewards/sweep                      process pending backlog
/// /admin/rewards/{id}                       get reward
/// /admin/rewards/{id}/process               manually process reward
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(feedback::router())
        .nest("/qr", qr::router())
        .nest("/rewards", rewards::router())
        .nest("/webhooks", webhooks::router())
        .nest("/admin", admin::router())
}
