//! Handlers for the telecom provider's callback endpoints.
//!
//! Both endpoints follow the provider's contract, not this API's
//! conventions: they always answer 200, because a non-2xx response
//! makes the provider retry (or, for validation, reject the send), and
//! a malformed or unmatchable notification is our problem to log, not
//! the provider's problem to redeliver.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use zawadi_ledger::DeliveryNotification;

use crate::state::AppState;

/// POST /api/v1/webhooks/telco/validation
///
/// The provider calls this before dispatching a bundle to ask whether
/// the pending transaction should proceed. Every request is approved:
/// sends are only ever initiated by the ledger, so anything arriving
/// here was already decided.
pub async fn validation(body: Bytes) -> Json<Value> {
    tracing::info!(
        payload = %String::from_utf8_lossy(&body),
        "Provider validation callback"
    );

    Json(json!({ "status": "Validated" }))
}

/// POST /api/v1/webhooks/telco/notification
///
/// Final delivery status for a dispatched bundle. The provider posts
/// either JSON or a form-encoded body depending on the channel, so the
/// payload is parsed manually rather than through a typed extractor.
/// Reconciliation is best-effort; the 200 goes back regardless of what
/// the payload matched.
pub async fn notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    match parse_notification(&headers, &body) {
        Some(notification) => state.reconciler.reconcile(notification).await,
        None => tracing::warn!(
            payload = %String::from_utf8_lossy(&body),
            "Unparseable delivery notification ignored"
        ),
    }

    Json(json!({ "status": "Received" }))
}

fn parse_notification(headers: &HeaderMap, body: &[u8]) -> Option<DeliveryNotification> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return serde_urlencoded::from_bytes(body).ok();
    }

    // JSON otherwise; the provider is not strict about content types,
    // so fall back to form decoding when JSON parsing fails.
    serde_json::from_slice(body)
        .ok()
        .or_else(|| serde_urlencoded::from_bytes(body).ok())
}
