use axum::routing::get;
use axum::Router;

use crate::handlers::qr;
use crate::state::AppState;

/// Public QR routes — mounted at `/qr`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(qr::validate_token))
}
