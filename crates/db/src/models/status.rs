//! Reward lifecycle status, stored as TEXT in the `rewards` table.
//!
//! The status column is the state machine at the heart of fulfillment:
//!
//! ```text
//! pending -> processing -> {sent | failed}
//! sent -> claimed
//! ```
//!
//! No other transition is legal. `sent`, `failed` and `claimed` are
//! terminal for the Ledger's own operations; the webhook reconciler may
//! resolve a row stuck in `processing` out-of-band, but it still only
//! ever moves it to `sent` or `failed`.

use serde::{Deserialize, Serialize};

/// Reward fulfillment status.
///
/// The `rewards.status` column stays a raw `String` on the row struct
/// (mirroring the check constraint); this enum provides the named
/// constants bound into queries and the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardStatus {
    Pending,
    Processing,
    Sent,
    Failed,
    Claimed,
}

impl RewardStatus {
    /// The TEXT value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            RewardStatus::Pending => "pending",
            RewardStatus::Processing => "processing",
            RewardStatus::Sent => "sent",
            RewardStatus::Failed => "failed",
            RewardStatus::Claimed => "claimed",
        }
    }

    /// Parse the stored TEXT value. Returns `None` for anything outside
    /// the check constraint.
    pub fn parse(s: &str) -> Option<RewardStatus> {
        match s {
            "pending" => Some(RewardStatus::Pending),
            "processing" => Some(RewardStatus::Processing),
            "sent" => Some(RewardStatus::Sent),
            "failed" => Some(RewardStatus::Failed),
            "claimed" => Some(RewardStatus::Claimed),
            _ => None,
        }
    }

    /// Whether the Ledger considers this status final.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RewardStatus::Sent | RewardStatus::Failed | RewardStatus::Claimed
        )
    }

    /// Whether `self -> next` is a legal forward transition.
    pub fn can_transition_to(self, next: RewardStatus) -> bool {
        matches!(
            (self, next),
            (RewardStatus::Pending, RewardStatus::Processing)
                | (RewardStatus::Processing, RewardStatus::Sent)
                | (RewardStatus::Processing, RewardStatus::Failed)
                | (RewardStatus::Sent, RewardStatus::Claimed)
        )
    }
}
