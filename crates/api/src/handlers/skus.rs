//! Admin handlers for product SKU management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;
use zawadi_core::error::CoreError;
use zawadi_core::reward::RewardPlan;
use zawadi_db::models::sku::CreateSku;
use zawadi_db::repositories::SkuRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/skus
///
/// Register a product SKU. The weight tier and reward amount decide
/// the bundle strategy for every token later minted against it.
pub async fn create_sku(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateSku>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "SKU name must not be empty".into(),
        )));
    }
    if input.reward_amount_mb <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Reward amount must be positive".into(),
        )));
    }

    let plan = RewardPlan::resolve(Some(&input.weight), input.reward_amount_mb as u32);

    let sku = SkuRepo::create(&state.pool, &input).await?;

    tracing::info!(
        sku_id = %sku.id,
        weight = %sku.weight,
        bundle = %plan.bundle,
        repeat_count = plan.repeat_count,
        "Product SKU created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: sku })))
}

/// GET /api/v1/admin/skus/{id}
pub async fn get_sku(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sku = SkuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product SKU",
            id,
        }))?;

    Ok(Json(DataResponse { data: sku }))
}
