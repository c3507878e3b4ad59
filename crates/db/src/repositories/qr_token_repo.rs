//! Repository for the `qr_tokens` table.
//!
//! Tokens are created in bulk by the admin batch generator and consumed
//! exactly once. The `is_used` flip itself lives in
//! [`FeedbackRepo::create_with_reward`](super::FeedbackRepo::create_with_reward)
//! because it must be atomic with the feedback and reward inserts.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::qr_token::{CreateQrBatch, QrToken};

/// Column list for `qr_tokens` queries.
const COLUMNS: &str = "\
    id, sku_id, campaign_id, batch_number, is_used, used_by, used_at, \
    url, created_at";

/// Hard cap on tokens per generated batch.
const MAX_BATCH_SIZE: u32 = 10_000;

pub struct QrTokenRepo;

impl QrTokenRepo {
    /// Find a token by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<QrToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qr_tokens WHERE id = $1");
        sqlx::query_as::<_, QrToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Bulk-create a batch of tokens for one SKU.
    ///
    /// Each token gets a fresh UUID and a redemption URL of the form
    /// `{base_url}/qr/{id}`. All inserts run in one transaction so a
    /// batch is either fully created or not at all. The batch size is
    /// capped at [`MAX_BATCH_SIZE`].
    pub async fn create_batch(
        pool: &PgPool,
        input: &CreateQrBatch,
        base_url: &str,
    ) -> Result<Vec<QrToken>, sqlx::Error> {
        let quantity = input.quantity.min(MAX_BATCH_SIZE);
        let mut tokens = Vec::with_capacity(quantity as usize);

        let query = format!(
            "INSERT INTO qr_tokens (id, sku_id, campaign_id, batch_number, url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        for _ in 0..quantity {
            let id = Uuid::new_v4();
            let url = format!("{base_url}/qr/{id}");

            let token = sqlx::query_as::<_, QrToken>(&query)
                .bind(id)
                .bind(input.sku_id)
                .bind(input.campaign_id)
                .bind(input.batch_number)
                .bind(&url)
                .fetch_one(&mut *tx)
                .await?;
            tokens.push(token);
        }
        tx.commit().await?;

        Ok(tokens)
    }

    /// Count unused tokens in a batch (admin observability).
    pub async fn count_unused_in_batch(
        pool: &PgPool,
        batch_number: i32,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM qr_tokens WHERE batch_number = $1 AND is_used = FALSE",
        )
        .bind(batch_number)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
