//! Handlers for reward inspection, manual processing, and claiming.
//!
//! The admin endpoints exist for operations: inspecting the ledger,
//! retry-processing a stuck reward, and sweeping the pending backlog.
//! The claim endpoint is customer-facing and re-delivers a `sent`
//! reward's bundle.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zawadi_core::error::CoreError;
use zawadi_db::models::reward::RewardListQuery;
use zawadi_db::repositories::RewardRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/rewards
///
/// List rewards, newest first, optionally filtered by status.
pub async fn list_rewards(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<RewardListQuery>,
) -> AppResult<impl IntoResponse> {
    let rewards = RewardRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: rewards }))
}

/// GET /api/v1/admin/rewards/{id}
pub async fn get_reward(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let reward = RewardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Reward",
            id,
        }))?;

    Ok(Json(DataResponse { data: reward }))
}

/// POST /api/v1/admin/rewards/{id}/process
///
/// Manually push one `pending` reward through fulfillment. Returns the
/// outcome either way; a send failure lands the reward in `failed`
/// rather than erroring the request.
pub async fn process_reward(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.ledger.process(id).await?;

    Ok(Json(DataResponse { data: outcome }))
}

/// Query parameters for the pending sweep.
#[derive(Debug, Deserialize)]
pub struct SweepParams {
    /// Page size; defaults to the ledger's sweep limit.
    pub limit: Option<i64>,
}

/// POST /api/v1/admin/rewards/sweep
///
/// Process a bounded page of `pending` rewards, oldest first.
pub async fn sweep_rewards(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<SweepParams>,
) -> AppResult<impl IntoResponse> {
    let report = state.ledger.sweep_pending(params.limit).await?;

    tracing::info!(
        processed = report.processed,
        successful = report.successful,
        failed = report.failed,
        "Pending reward sweep finished"
    );

    Ok(Json(DataResponse { data: report }))
}

/// Request body for claiming a reward.
#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub phone_number: String,
}

/// Response payload for a successful claim.
#[derive(Debug, Serialize)]
pub struct ClaimReceipt {
    pub reward_id: Uuid,
    pub transaction_id: String,
}

/// POST /api/v1/rewards/{id}/claim
///
/// Re-deliver a `sent` reward's bundle and mark it `claimed`. Unlike
/// processing, a gateway failure here is surfaced to the caller so the
/// customer can try again.
pub async fn claim_reward(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ClaimRequest>,
) -> AppResult<impl IntoResponse> {
    let transaction_id = state.ledger.claim(id, &input.phone_number).await?;

    Ok(Json(DataResponse {
        data: ClaimReceipt {
            reward_id: id,
            transaction_id,
        },
    }))
}
