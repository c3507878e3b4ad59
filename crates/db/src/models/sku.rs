//! Product SKU entity and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use zawadi_core::types::Timestamp;

/// A row from the `product_skus` table.
///
/// Immutable after creation as far as fulfillment is concerned: the
/// weight tier and reward amount printed on a QR batch must not drift
/// under already-distributed products.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sku {
    pub id: Uuid,
    pub name: String,
    pub weight: String,
    pub price_ksh: i32,
    pub reward_amount_mb: i32,
    pub reward_description: String,
    pub created_at: Timestamp,
}

/// DTO for creating a SKU.
#[derive(Debug, Deserialize)]
pub struct CreateSku {
    pub name: String,
    pub weight: String,
    pub price_ksh: i32,
    pub reward_amount_mb: i32,
    pub reward_description: String,
}
