//! Handler for the public feedback submission endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use zawadi_ledger::SubmitFeedback;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/feedback
///
/// Submit customer feedback for a scanned QR token. On success the
/// reward has already been attempted synchronously; `reward_status`
/// in the response tells the customer whether the bundle went out.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(input): Json<SubmitFeedback>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.intake.submit(input).await?;

    tracing::info!(
        feedback_id = %outcome.feedback_id,
        reward_id = %outcome.reward_id,
        reward_status = ?outcome.reward_status,
        "Feedback submitted"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}
