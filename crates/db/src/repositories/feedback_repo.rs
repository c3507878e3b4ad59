//! Repository for the `feedback` table, including the atomic
//! feedback + reward + token-use triple-write.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::feedback::{Feedback, NewFeedback};
use crate::models::reward::Reward;
use crate::models::status::RewardStatus;

/// Column list for `feedback` queries.
const FEEDBACK_COLUMNS: &str = "\
    id, qr_id, sku_id, campaign_id, customer_name, customer_phone, \
    rating, custom_answers, verified, created_at";

/// Column list for `rewards` queries (shared with `RewardRepo`).
const REWARD_COLUMNS: &str = "\
    id, feedback_id, qr_id, customer_phone, reward_name, amount_mb, \
    status, transaction_id, error_message, sent_at, claimed_at, \
    created_at, updated_at";

pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Whether feedback already exists for this `(phone, token)` pair.
    ///
    /// The check runs before the write for a friendly 409; the
    /// `uq_feedback_phone_token` constraint still catches the race.
    pub async fn exists_for_phone_and_token(
        pool: &PgPool,
        customer_phone: &str,
        qr_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM feedback WHERE customer_phone = $1 AND qr_id = $2",
        )
        .bind(customer_phone)
        .bind(qr_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Find a feedback row by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically create the feedback row, its pending reward, and flip
    /// the QR token to used.
    ///
    /// All three writes share one transaction: a counted-as-used token
    /// with no reward, or a reward with no feedback provenance, must be
    /// impossible. The token update is conditional on `is_used = FALSE`;
    /// if another submission consumed the token first, the whole
    /// transaction rolls back and `Ok(None)` is returned (the caller
    /// maps this to a 409).
    pub async fn create_with_reward(
        pool: &PgPool,
        input: &NewFeedback,
    ) -> Result<Option<(Feedback, Reward)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let feedback_query = format!(
            "INSERT INTO feedback \
                 (qr_id, sku_id, campaign_id, customer_name, customer_phone, \
                  rating, custom_answers, verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) \
             RETURNING {FEEDBACK_COLUMNS}"
        );
        let feedback = sqlx::query_as::<_, Feedback>(&feedback_query)
            .bind(input.qr_id)
            .bind(input.sku_id)
            .bind(input.campaign_id)
            .bind(&input.customer_name)
            .bind(&input.customer_phone)
            .bind(input.rating)
            .bind(&input.custom_answers)
            .fetch_one(&mut *tx)
            .await?;

        let reward_query = format!(
            "INSERT INTO rewards \
                 (feedback_id, qr_id, customer_phone, reward_name, amount_mb, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REWARD_COLUMNS}"
        );
        let reward = sqlx::query_as::<_, Reward>(&reward_query)
            .bind(feedback.id)
            .bind(input.qr_id)
            .bind(&input.customer_phone)
            .bind(&input.reward_name)
            .bind(input.reward_amount_mb)
            .bind(RewardStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let token_update = sqlx::query(
            "UPDATE qr_tokens \
             SET is_used = TRUE, used_by = $2, used_at = NOW() \
             WHERE id = $1 AND is_used = FALSE",
        )
        .bind(input.qr_id)
        .bind(&input.customer_phone)
        .execute(&mut *tx)
        .await?;

        if token_update.rows_affected() == 0 {
            // Lost the race for the token; undo the inserts.
            tx.rollback().await?;
            tracing::warn!(qr_id = %input.qr_id, "QR token consumed concurrently, rolling back");
            return Ok(None);
        }

        tx.commit().await?;

        tracing::info!(
            feedback_id = %feedback.id,
            reward_id = %reward.id,
            qr_id = %input.qr_id,
            "Feedback, reward and token-use committed"
        );

        Ok(Some((feedback, reward)))
    }
}
