//! Feedback entity and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use zawadi_core::types::Timestamp;

/// A row from the `feedback` table.
///
/// Immutable after creation. At most one row per `(customer_phone,
/// qr_id)` pair, enforced by `uq_feedback_phone_token`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Feedback {
    pub id: Uuid,
    pub qr_id: Uuid,
    pub sku_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub rating: i32,
    pub custom_answers: serde_json::Value,
    pub verified: bool,
    pub created_at: Timestamp,
}

/// Insert payload for the atomic feedback + reward + token-use write.
///
/// `customer_phone` must already be normalized; the intake service is
/// the only constructor.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub qr_id: Uuid,
    pub sku_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub rating: i32,
    pub custom_answers: serde_json::Value,
    pub reward_name: String,
    pub reward_amount_mb: i32,
}
