//! Repository for the `rewards` table.
//!
//! Every status transition is a conditional single-row update: the
//! `WHERE status = ...` guard is the mutual-exclusion point for
//! concurrent processors, so no in-memory locking is needed anywhere.

use sqlx::PgPool;
use uuid::Uuid;
use zawadi_core::types::Timestamp;

use crate::models::reward::{Reward, RewardListQuery};
use crate::models::status::RewardStatus;

/// Column list for `rewards` queries.
const COLUMNS: &str = "\
    id, feedback_id, qr_id, customer_phone, reward_name, amount_mb, \
    status, transaction_id, error_message, sent_at, claimed_at, \
    created_at, updated_at";

/// Maximum page size for reward listing and the pending sweep.
const MAX_LIMIT: i64 = 100;

/// Default page size for reward listing.
const DEFAULT_LIMIT: i64 = 50;

pub struct RewardRepo;

impl RewardRepo {
    /// Find a reward by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rewards WHERE id = $1");
        sqlx::query_as::<_, Reward>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a reward by the provider transaction id of its last send.
    pub async fn find_by_transaction_id(
        pool: &PgPool,
        transaction_id: &str,
    ) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rewards WHERE transaction_id = $1");
        sqlx::query_as::<_, Reward>(&query)
            .bind(transaction_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent `processing` reward for a phone number.
    ///
    /// Webhook fallback when the provider callback carries no known
    /// transaction id. If two rewards for one phone are in `processing`
    /// simultaneously this may pick the wrong one; "most recent" is the
    /// only tie-break the system defines.
    pub async fn find_latest_processing_by_phone(
        pool: &PgPool,
        customer_phone: &str,
    ) -> Result<Option<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE customer_phone = $1 AND status = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(customer_phone)
            .bind(RewardStatus::Processing.as_str())
            .fetch_optional(pool)
            .await
    }

    /// `pending -> processing`, the in-flight optimistic lock.
    ///
    /// Returns `false` when the reward was not in `pending` (already
    /// picked up by a concurrent processor, or already resolved).
    pub async fn mark_processing(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rewards \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(RewardStatus::Processing.as_str())
        .bind(RewardStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `processing -> sent`, recording the provider transaction id.
    pub async fn mark_sent(
        pool: &PgPool,
        id: Uuid,
        transaction_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rewards \
             SET status = $2, transaction_id = $3, sent_at = NOW(), \
                 error_message = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(RewardStatus::Sent.as_str())
        .bind(transaction_id)
        .bind(RewardStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `processing -> failed`. No transaction id is recorded.
    pub async fn mark_failed(
        pool: &PgPool,
        id: Uuid,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rewards \
             SET status = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(RewardStatus::Failed.as_str())
        .bind(error)
        .bind(RewardStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `sent -> claimed`, after the claim re-delivery succeeded.
    pub async fn mark_claimed(
        pool: &PgPool,
        id: Uuid,
        transaction_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE rewards \
             SET status = $2, transaction_id = $3, claimed_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(RewardStatus::Claimed.as_str())
        .bind(transaction_id)
        .bind(RewardStatus::Sent.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resolve a reward from a provider delivery callback.
    ///
    /// Applied to the row the reconciler matched (by transaction id, or
    /// by the phone fallback). `sent_at` uses the provider-supplied
    /// timestamp when one was parseable, otherwise the receipt time.
    pub async fn resolve_from_notification(
        pool: &PgPool,
        id: Uuid,
        delivered: bool,
        provider_timestamp: Option<Timestamp>,
        provider_error: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        if delivered {
            sqlx::query(
                "UPDATE rewards \
                 SET status = $2, sent_at = COALESCE($3, NOW()), updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(RewardStatus::Sent.as_str())
            .bind(provider_timestamp)
            .execute(pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE rewards \
                 SET status = $2, error_message = COALESCE($3, error_message), \
                     updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(RewardStatus::Failed.as_str())
            .bind(provider_error)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    /// List `pending` rewards for the batch sweep, oldest first.
    pub async fn list_pending(pool: &PgPool, limit: i64) -> Result<Vec<Reward>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rewards \
             WHERE status = $1 \
             ORDER BY created_at ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Reward>(&query)
            .bind(RewardStatus::Pending.as_str())
            .bind(limit.clamp(1, MAX_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Admin listing with optional status filter and pagination.
    pub async fn list(
        pool: &PgPool,
        params: &RewardListQuery,
    ) -> Result<Vec<Reward>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        if let Some(status) = &params.status {
            let query = format!(
                "SELECT {COLUMNS} FROM rewards \
                 WHERE status = $1 \
                 ORDER BY created_at DESC \
                 LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, Reward>(&query)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        } else {
            let query = format!(
                "SELECT {COLUMNS} FROM rewards \
                 ORDER BY created_at DESC \
                 LIMIT $1 OFFSET $2"
            );
            sqlx::query_as::<_, Reward>(&query)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        }
    }
}
