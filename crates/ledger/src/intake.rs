//! Feedback intake: validation, rate limiting, duplicate rejection, and
//! the atomic hand-off into the ledger.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use zawadi_core::error::CoreError;
use zawadi_core::phone;
use zawadi_db::models::feedback::NewFeedback;
use zawadi_db::models::status::RewardStatus;
use zawadi_db::repositories::{FeedbackRepo, QrTokenRepo, SkuRepo};
use zawadi_db::DbPool;

use crate::error::LedgerResult;
use crate::ledger::RewardLedger;
use crate::rate_limit::RateLimitStore;

/// Max feedback submissions per phone per rolling window.
const RATE_LIMIT_MAX: u32 = 3;

/// Rolling window length: 5 minutes.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(300);

/// Rating applied when the customer skips the stars.
const DEFAULT_RATING: i32 = 3;

/// Inbound feedback submission.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitFeedback {
    pub qr_id: Uuid,
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub customer_name: Option<String>,
    #[validate(length(min = 10, max = 15, message = "Phone number must be 10-15 digits"))]
    pub customer_phone: String,
    pub rating: Option<i32>,
    pub custom_answers: Option<serde_json::Value>,
    pub campaign_id: Option<Uuid>,
}

/// What the caller gets back. The submission itself succeeded whenever
/// this struct is returned; `reward_status` is the only signal of a
/// send failure.
#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
    pub feedback_id: Uuid,
    pub reward_id: Uuid,
    pub reward_name: String,
    pub amount_mb: i32,
    pub reward_status: RewardStatus,
    pub transaction_id: Option<String>,
    pub error: Option<String>,
}

/// Service validating submissions and triggering fulfillment.
pub struct FeedbackIntake {
    pool: DbPool,
    ledger: Arc<RewardLedger>,
    rate_limits: Arc<dyn RateLimitStore>,
}

impl FeedbackIntake {
    pub fn new(
        pool: DbPool,
        ledger: Arc<RewardLedger>,
        rate_limits: Arc<dyn RateLimitStore>,
    ) -> Self {
        Self {
            pool,
            ledger,
            rate_limits,
        }
    }

    /// Process one feedback submission end to end.
    ///
    /// Pipeline: rate limit -> validation -> duplicate check -> token
    /// check -> atomic triple-write -> synchronous send. A reward-send
    /// failure does NOT fail the submission: the feedback must never be
    /// lost to a downstream network blip, so the outcome reports
    /// `failed` in `reward_status` instead.
    pub async fn submit(&self, input: SubmitFeedback) -> LedgerResult<SubmissionOutcome> {
        // Normalize first so the rate-limit key and every stored row
        // agree on one canonical form.
        let customer_phone = phone::normalize(&input.customer_phone)?;

        let decision = self
            .rate_limits
            .check(&customer_phone, RATE_LIMIT_MAX, RATE_LIMIT_WINDOW)
            .await;
        if !decision.allowed {
            tracing::warn!(phone = %customer_phone, "Feedback submission rate limited");
            return Err(CoreError::RateLimited {
                retry_after_secs: decision.retry_after.as_secs().max(1),
            }
            .into());
        }

        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;

        // Duplicate pair check is independent of token state: a reused
        // phone on an already-consumed token must still be a conflict,
        // not a not-found, to keep replay probing unrewarding.
        if FeedbackRepo::exists_for_phone_and_token(&self.pool, &customer_phone, input.qr_id)
            .await?
        {
            tracing::warn!(phone = %customer_phone, qr_id = %input.qr_id, "Duplicate feedback submission");
            return Err(CoreError::Conflict(
                "You have already submitted feedback for this product".to_string(),
            )
            .into());
        }

        let token = QrTokenRepo::find_by_id(&self.pool, input.qr_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "QR token",
                id: input.qr_id,
            })?;

        if token.is_used {
            tracing::warn!(qr_id = %token.id, "QR token already used");
            return Err(
                CoreError::Conflict("QR code is invalid or already used".to_string()).into(),
            );
        }

        let sku = SkuRepo::find_by_id(&self.pool, token.sku_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SKU",
                id: token.sku_id,
            })?;

        let rating = input.rating.unwrap_or(DEFAULT_RATING).clamp(1, 5);

        let new_feedback = NewFeedback {
            qr_id: token.id,
            sku_id: sku.id,
            campaign_id: input.campaign_id.or(token.campaign_id),
            customer_name: input
                .customer_name
                .unwrap_or_else(|| "Anonymous".to_string()),
            customer_phone: customer_phone.clone(),
            rating,
            custom_answers: input
                .custom_answers
                .unwrap_or_else(|| serde_json::json!({})),
            reward_name: sku.reward_description.clone(),
            reward_amount_mb: sku.reward_amount_mb,
        };

        let (feedback, reward) =
            FeedbackRepo::create_with_reward(&self.pool, &new_feedback)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict("QR code is invalid or already used".to_string())
                })?;

        tracing::info!(
            feedback_id = %feedback.id,
            reward_id = %reward.id,
            phone = %customer_phone,
            rating,
            "Feedback submitted"
        );

        // Synchronous send. Whatever happens here, the submission is
        // already durable and is reported as a success.
        let (reward_status, transaction_id, error) =
            match self.ledger.process(reward.id).await {
                Ok(outcome) => (outcome.status, outcome.transaction_id, outcome.error),
                Err(err) => {
                    tracing::error!(reward_id = %reward.id, error = %err, "Reward processing errored after submission");
                    (RewardStatus::Pending, None, Some(err.to_string()))
                }
            };

        Ok(SubmissionOutcome {
            feedback_id: feedback.id,
            reward_id: reward.id,
            reward_name: reward.reward_name,
            amount_mb: reward.amount_mb,
            reward_status,
            transaction_id,
            error,
        })
    }
}
