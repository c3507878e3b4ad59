//! The reward ledger: owner of every write to `rewards.status`.
//!
//! Lifecycle it enforces:
//!
//! ```text
//! pending -> processing -> {sent | failed}
//! sent -> claimed
//! ```
//!
//! `pending -> processing` is a conditional update and doubles as the
//! optimistic lock: a reward can only be picked up by one processor. A
//! crash after that transition leaves the row in `processing`; the
//! batch sweep and the webhook reconciler are the mechanisms that close
//! that gap, never an automatic retry of the same request.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;
use zawadi_core::error::CoreError;
use zawadi_core::phone;
use zawadi_core::reward::RewardPlan;
use zawadi_db::models::reward::Reward;
use zawadi_db::models::status::RewardStatus;
use zawadi_db::repositories::{RewardRepo, SkuRepo};
use zawadi_db::DbPool;
use zawadi_telco::BundleSender;

use crate::error::LedgerResult;

/// Default page size for the pending sweep.
const SWEEP_LIMIT: i64 = 50;

/// Per-reward outcome of a processing attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessOutcome {
    pub reward_id: Uuid,
    pub status: RewardStatus,
    pub transaction_id: Option<String>,
    pub error: Option<String>,
}

/// Aggregated result of a batch sweep.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub processed: u32,
    pub successful: u32,
    pub failed: u32,
    pub outcomes: Vec<ProcessOutcome>,
}

/// Service owning reward status transitions.
pub struct RewardLedger {
    pool: DbPool,
    sender: Arc<dyn BundleSender>,
}

impl RewardLedger {
    pub fn new(pool: DbPool, sender: Arc<dyn BundleSender>) -> Self {
        Self { pool, sender }
    }

    /// Resolve the bundle strategy for a reward.
    ///
    /// Recognized SKU weight tiers (via feedback -> sku) pick the
    /// repeat-send plan; anything else falls back to the amount-based
    /// mapping. Always succeeds.
    async fn plan_for(&self, reward: &Reward) -> LedgerResult<RewardPlan> {
        let weight = SkuRepo::find_for_feedback(&self.pool, reward.feedback_id)
            .await?
            .map(|sku| sku.weight);

        let amount_mb = u32::try_from(reward.amount_mb).unwrap_or(0);
        let plan = RewardPlan::resolve(weight.as_deref(), amount_mb);

        tracing::info!(
            reward_id = %reward.id,
            weight = weight.as_deref().unwrap_or("none"),
            bundle = %plan.bundle,
            repeat_count = plan.repeat_count,
            total_mb = plan.total_mb(),
            "Resolved bundle strategy"
        );
        Ok(plan)
    }

    /// Drive one reward through `pending -> processing -> {sent|failed}`.
    ///
    /// Gateway failures never escape as errors: the reward resolves to
    /// `failed` and the outcome records why. Errors are returned only
    /// for missing rewards, transition conflicts, and database faults.
    pub async fn process(&self, reward_id: Uuid) -> LedgerResult<ProcessOutcome> {
        let reward = RewardRepo::find_by_id(&self.pool, reward_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Reward",
                id: reward_id,
            })?;

        // Optimistic lock: only one processor wins the pending row.
        if !RewardRepo::mark_processing(&self.pool, reward_id).await? {
            return Err(CoreError::Conflict(format!(
                "Reward is not pending (current status: {})",
                reward.status
            ))
            .into());
        }

        let plan = self.plan_for(&reward).await?;

        match self
            .sender
            .send_bundle(&reward.customer_phone, plan.bundle, plan.repeat_count)
            .await
        {
            Ok(receipt) => {
                if !RewardRepo::mark_sent(&self.pool, reward_id, &receipt.transaction_id).await? {
                    // The reconciler resolved the row first; its verdict
                    // stands, but the delivery still happened.
                    tracing::warn!(
                        reward_id = %reward_id,
                        transaction_id = %receipt.transaction_id,
                        "Reward left processing concurrently; sent marker not applied"
                    );
                }
                tracing::info!(
                    reward_id = %reward_id,
                    transaction_id = %receipt.transaction_id,
                    "Reward sent"
                );
                Ok(ProcessOutcome {
                    reward_id,
                    status: RewardStatus::Sent,
                    transaction_id: Some(receipt.transaction_id),
                    error: None,
                })
            }
            Err(err) => {
                let message = err.to_string();
                if !RewardRepo::mark_failed(&self.pool, reward_id, &message).await? {
                    tracing::warn!(
                        reward_id = %reward_id,
                        "Reward left processing concurrently; failure marker not applied"
                    );
                }
                tracing::warn!(reward_id = %reward_id, error = %message, "Reward send failed");
                Ok(ProcessOutcome {
                    reward_id,
                    status: RewardStatus::Failed,
                    transaction_id: None,
                    error: Some(message),
                })
            }
        }
    }

    /// Claim a `sent` reward: deliberately re-deliver the equivalent
    /// bundle and mark the row `claimed`.
    ///
    /// This is a user-visible second delivery, not an idempotent replay
    /// of the original send, and it is only permitted from `sent`.
    /// Unlike [`Self::process`], a gateway failure here propagates —
    /// the row stays `sent` and the customer may try again.
    pub async fn claim(&self, reward_id: Uuid, phone_number: &str) -> LedgerResult<String> {
        // A malformed phone is the caller's mistake, not a delivery
        // failure: reject it before any lookup or send.
        let phone_number = phone::normalize(phone_number)?;

        let reward = RewardRepo::find_by_id(&self.pool, reward_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Reward",
                id: reward_id,
            })?;

        if RewardStatus::parse(&reward.status) != Some(RewardStatus::Sent) {
            return Err(CoreError::Conflict(format!(
                "Reward cannot be claimed in its current status ({})",
                reward.status
            ))
            .into());
        }

        let plan = self.plan_for(&reward).await?;

        let receipt = self
            .sender
            .send_bundle(&phone_number, plan.bundle, plan.repeat_count)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to send data bundle: {e}")))?;

        if !RewardRepo::mark_claimed(&self.pool, reward_id, &receipt.transaction_id).await? {
            // The bundle is already delivered; only the claim marker lost a race.
            tracing::warn!(
                reward_id = %reward_id,
                transaction_id = %receipt.transaction_id,
                "Claim delivered but status changed concurrently"
            );
            return Err(CoreError::Conflict(
                "Reward status changed while claiming".to_string(),
            )
            .into());
        }

        tracing::info!(
            reward_id = %reward_id,
            transaction_id = %receipt.transaction_id,
            "Reward claimed"
        );
        Ok(receipt.transaction_id)
    }

    /// Sweep `pending` rewards (bounded page) through [`Self::process`].
    ///
    /// Each reward is processed independently: one failure, of any
    /// kind, never aborts the batch. Every item's outcome is recorded.
    pub async fn sweep_pending(&self, limit: Option<i64>) -> LedgerResult<SweepReport> {
        let pending =
            RewardRepo::list_pending(&self.pool, limit.unwrap_or(SWEEP_LIMIT)).await?;

        let mut report = SweepReport::default();

        for reward in pending {
            report.processed += 1;
            match self.process(reward.id).await {
                Ok(outcome) => {
                    if outcome.status == RewardStatus::Sent {
                        report.successful += 1;
                    } else {
                        report.failed += 1;
                    }
                    report.outcomes.push(outcome);
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(reward_id = %reward.id, error = %err, "Sweep item errored");
                    report.outcomes.push(ProcessOutcome {
                        reward_id: reward.id,
                        status: RewardStatus::Pending,
                        transaction_id: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            successful = report.successful,
            failed = report.failed,
            "Pending sweep complete"
        );
        Ok(report)
    }
}
