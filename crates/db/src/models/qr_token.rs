//! QR token entity and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use zawadi_core::types::Timestamp;

/// A row from the `qr_tokens` table.
///
/// One token identifies one physical product unit. Once `is_used` is
/// set, the token is permanently terminal; the flip happens inside the
/// same transaction that creates the feedback and reward rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QrToken {
    pub id: Uuid,
    pub sku_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub batch_number: i32,
    pub is_used: bool,
    pub used_by: Option<String>,
    pub used_at: Option<Timestamp>,
    pub url: String,
    pub created_at: Timestamp,
}

/// DTO for bulk-generating a QR batch via the admin API.
#[derive(Debug, Deserialize)]
pub struct CreateQrBatch {
    pub sku_id: Uuid,
    pub quantity: u32,
    pub batch_number: i32,
    pub campaign_id: Option<Uuid>,
}
