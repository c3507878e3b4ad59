//! Reward entity and listing DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use zawadi_core::types::Timestamp;

/// A row from the `rewards` table.
///
/// `status` is raw TEXT; use
/// [`RewardStatus`](super::status::RewardStatus) for the named values
/// and the transition rules. All writes go through `RewardRepo` so the
/// conditional-update guards cannot be bypassed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reward {
    pub id: Uuid,
    pub feedback_id: Uuid,
    pub qr_id: Uuid,
    pub customer_phone: String,
    pub reward_name: String,
    pub amount_mb: i32,
    pub status: String,
    pub transaction_id: Option<String>,
    pub error_message: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Query parameters for the admin reward listing.
#[derive(Debug, Deserialize)]
pub struct RewardListQuery {
    /// Filter by status text (e.g. `pending`, `failed`).
    pub status: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
