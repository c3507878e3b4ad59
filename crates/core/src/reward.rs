//! Reward plan resolution.
//!
//! The provider does not sell a 100MB or 150MB reward bundle at our price
//! point, so those face values are fulfilled by sending the 50MB unit
//! multiple times. The customer sees only the total printed on the QR
//! code; the repeat sends are transparent to them. Do not "optimize" this
//! into a single larger bundle: the repeat-send strategy is what keeps
//! the delivered amount equal to the printed face value.

use serde::Serialize;

use crate::bundle::BundleSize;

/// How one reward is fulfilled: which bundle unit goes out, how many
/// times, and the total face value the customer was promised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardPlan {
    pub bundle: BundleSize,
    pub repeat_count: u32,
    pub face_value_mb: u32,
}

/// Human-readable descriptions for the recognized weight tiers.
pub const DESCRIPTION_340G: &str = "100MB Safaricom Data Bundle";
pub const DESCRIPTION_500G: &str = "150MB Safaricom Data Bundle";

impl RewardPlan {
    /// Resolve the plan for a SKU weight tier.
    ///
    /// * `340g` => 2 x 50MB = 100MB
    /// * `500g` => 3 x 50MB = 150MB
    ///
    /// Unrecognized tiers return `None`; callers fall back to
    /// [`RewardPlan::for_amount_mb`].
    pub fn for_weight(weight: &str) -> Option<RewardPlan> {
        match weight.trim().to_ascii_lowercase().as_str() {
            "340g" => Some(RewardPlan {
                bundle: BundleSize::Mb50,
                repeat_count: 2,
                face_value_mb: 100,
            }),
            "500g" => Some(RewardPlan {
                bundle: BundleSize::Mb50,
                repeat_count: 3,
                face_value_mb: 150,
            }),
            _ => None,
        }
    }

    /// Amount-based fallback: one send of the closest supported bundle.
    /// Always succeeds.
    pub fn for_amount_mb(amount_mb: u32) -> RewardPlan {
        let bundle = BundleSize::for_amount_mb(amount_mb);
        RewardPlan {
            bundle,
            repeat_count: 1,
            face_value_mb: amount_mb,
        }
    }

    /// Resolve from an optional weight tier with the amount fallback.
    pub fn resolve(weight: Option<&str>, amount_mb: u32) -> RewardPlan {
        weight
            .and_then(RewardPlan::for_weight)
            .unwrap_or_else(|| RewardPlan::for_amount_mb(amount_mb))
    }

    /// Total data delivered when the plan completes, in MB.
    pub fn total_mb(&self) -> u32 {
        self.bundle.megabytes() * self.repeat_count
    }
}
