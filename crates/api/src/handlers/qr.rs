//! Handlers for QR token validation and admin batch generation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;
use zawadi_core::error::CoreError;
use zawadi_db::models::qr_token::{CreateQrBatch, QrToken};
use zawadi_db::models::sku::Sku;
use zawadi_db::repositories::{QrTokenRepo, SkuRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for QR token validation.
#[derive(Debug, Serialize)]
pub struct QrValidation {
    /// Whether this token can still earn a reward.
    pub redeemable: bool,
    pub token: QrToken,
    pub sku: Sku,
}

/// GET /api/v1/qr/{id}
///
/// Validate a scanned token before presenting the feedback form.
/// A used token is still returned (200) so the client can show a
/// meaningful "already redeemed" screen instead of a bare error.
pub async fn validate_token(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let token = QrTokenRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QR token",
            id,
        }))?;

    let sku = SkuRepo::find_by_id(&state.pool, token.sku_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product SKU",
            id: token.sku_id,
        }))?;

    Ok(Json(DataResponse {
        data: QrValidation {
            redeemable: !token.is_used,
            token,
            sku,
        },
    }))
}

/// Response payload for batch generation.
#[derive(Debug, Serialize)]
pub struct QrBatch {
    pub batch_number: i32,
    pub count: usize,
    pub tokens: Vec<QrToken>,
}

/// POST /api/v1/admin/qr/batches
///
/// Bulk-generate QR tokens for one SKU. Admin only.
pub async fn create_batch(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateQrBatch>,
) -> AppResult<impl IntoResponse> {
    if input.quantity == 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Batch quantity must be at least 1".into(),
        )));
    }

    // The SKU must exist before we mint tokens pointing at it.
    SkuRepo::find_by_id(&state.pool, input.sku_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Product SKU",
            id: input.sku_id,
        }))?;

    let tokens =
        QrTokenRepo::create_batch(&state.pool, &input, &state.config.app_base_url).await?;

    tracing::info!(
        sku_id = %input.sku_id,
        batch_number = input.batch_number,
        count = tokens.len(),
        "QR batch generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: QrBatch {
                batch_number: input.batch_number,
                count: tokens.len(),
                tokens,
            },
        }),
    ))
}

/// Remaining-token count for one batch.
#[derive(Debug, Serialize)]
pub struct BatchStatus {
    pub batch_number: i32,
    pub unused: i64,
}

/// GET /api/v1/admin/qr/batches/{batch_number}
///
/// How many tokens in a batch are still unredeemed. Admin only.
pub async fn batch_status(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(batch_number): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let unused = QrTokenRepo::count_unused_in_batch(&state.pool, batch_number).await?;

    Ok(Json(DataResponse {
        data: BatchStatus {
            batch_number,
            unused,
        },
    }))
}
