//! Repository for the `product_skus` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::sku::{CreateSku, Sku};

/// Column list for `product_skus` queries.
const COLUMNS: &str =
    "id, name, weight, price_ksh, reward_amount_mb, reward_description, created_at";

pub struct SkuRepo;

impl SkuRepo {
    /// Create a new SKU.
    pub async fn create(pool: &PgPool, input: &CreateSku) -> Result<Sku, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_skus \
                 (name, weight, price_ksh, reward_amount_mb, reward_description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sku>(&query)
            .bind(&input.name)
            .bind(&input.weight)
            .bind(input.price_ksh)
            .bind(input.reward_amount_mb)
            .bind(&input.reward_description)
            .fetch_one(pool)
            .await
    }

    /// Find a SKU by its ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Sku>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_skus WHERE id = $1");
        sqlx::query_as::<_, Sku>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the SKU behind a feedback row (feedback -> sku).
    ///
    /// The Ledger uses this at fulfillment time to pick the bundle
    /// strategy from the SKU's weight tier.
    pub async fn find_for_feedback(
        pool: &PgPool,
        feedback_id: Uuid,
    ) -> Result<Option<Sku>, sqlx::Error> {
        let query = "SELECT s.id, s.name, s.weight, s.price_ksh, s.reward_amount_mb, \
                    s.reward_description, s.created_at \
             FROM product_skus s \
             JOIN feedback f ON f.sku_id = s.id \
             WHERE f.id = $1";
        sqlx::query_as::<_, Sku>(query)
            .bind(feedback_id)
            .fetch_optional(pool)
            .await
    }
}
