//! Database-backed integration tests for the fulfillment pipeline.
//!
//! Tests cover the submission happy path, duplicate and used-token
//! rejection, provider-failure handling, the processing optimistic
//! lock, webhook reconciliation, and claiming. The gateway is replaced
//! by a recording stub; everything else runs against a real schema.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use zawadi_core::bundle::BundleSize;
use zawadi_core::error::CoreError;
use zawadi_db::models::feedback::NewFeedback;
use zawadi_db::models::qr_token::{CreateQrBatch, QrToken};
use zawadi_db::models::sku::{CreateSku, Sku};
use zawadi_db::models::status::RewardStatus;
use zawadi_db::repositories::{FeedbackRepo, QrTokenRepo, RewardRepo, SkuRepo};
use zawadi_ledger::{
    DeliveryNotification, FeedbackIntake, InMemoryRateLimitStore, LedgerError, RewardLedger,
    SubmitFeedback, WebhookReconciler,
};
use zawadi_telco::{BundleReceipt, BundleSender, TelcoError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Gateway stub that records every send and can be told to fail.
#[derive(Default)]
struct RecordingSender {
    calls: AtomicU32,
    last_repeat: AtomicU32,
    fail: AtomicBool,
}

impl RecordingSender {
    fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn failing() -> Arc<Self> {
        let sender = Self::default();
        sender.fail.store(true, Ordering::SeqCst);
        Arc::new(sender)
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_repeat(&self) -> u32 {
        self.last_repeat.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl BundleSender for RecordingSender {
    async fn send_bundle(
        &self,
        phone_number: &str,
        bundle: BundleSize,
        repeat_count: u32,
    ) -> Result<BundleReceipt, TelcoError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.last_repeat.store(repeat_count, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(TelcoError::Provider("provider unreachable".into()));
        }

        Ok(BundleReceipt {
            transaction_id: format!("ATPid_{n}"),
            phone_number: phone_number.to_string(),
            bundle,
            status: "Sent".to_string(),
        })
    }
}

fn services(
    pool: &PgPool,
    sender: Arc<RecordingSender>,
) -> (Arc<RewardLedger>, FeedbackIntake) {
    let ledger = Arc::new(RewardLedger::new(pool.clone(), sender));
    let intake = FeedbackIntake::new(
        pool.clone(),
        Arc::clone(&ledger),
        Arc::new(InMemoryRateLimitStore::new()),
    );
    (ledger, intake)
}

/// Seed one 340g SKU (2 x 50MB plan) and a single unredeemed token.
async fn seed_sku_and_token(pool: &PgPool) -> (Sku, QrToken) {
    let sku = SkuRepo::create(
        pool,
        &CreateSku {
            name: "Crisps 340g".to_string(),
            weight: "340g".to_string(),
            price_ksh: 340,
            reward_amount_mb: 100,
            reward_description: "100MB Safaricom Data Bundle".to_string(),
        },
    )
    .await
    .expect("sku creation should succeed");

    let tokens = QrTokenRepo::create_batch(
        pool,
        &CreateQrBatch {
            sku_id: sku.id,
            quantity: 1,
            batch_number: 1,
            campaign_id: None,
        },
        "http://localhost:3000",
    )
    .await
    .expect("batch creation should succeed");

    let token = tokens.into_iter().next().expect("one token");
    (sku, token)
}

fn submission(qr_id: Uuid, phone: &str) -> SubmitFeedback {
    SubmitFeedback {
        qr_id,
        customer_name: Some("Wanjiku".to_string()),
        customer_phone: phone.to_string(),
        rating: Some(5),
        custom_answers: None,
        campaign_id: None,
    }
}

/// Create a reward directly through the atomic triple-write, bypassing
/// the intake pipeline, for tests that drive the ledger by hand.
async fn seed_reward(
    pool: &PgPool,
    sku: &Sku,
    token: &QrToken,
    phone: &str,
) -> zawadi_db::models::reward::Reward {
    let input = NewFeedback {
        qr_id: token.id,
        sku_id: sku.id,
        campaign_id: None,
        customer_name: "Wanjiku".to_string(),
        customer_phone: phone.to_string(),
        rating: 5,
        custom_answers: serde_json::json!({}),
        reward_name: sku.reward_description.clone(),
        reward_amount_mb: sku.reward_amount_mb,
    };
    let (_, reward) = FeedbackRepo::create_with_reward(pool, &input)
        .await
        .expect("triple-write should succeed")
        .expect("token should be unused");
    reward
}

async fn reward_count_for_token(pool: &PgPool, qr_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM rewards WHERE qr_id = $1")
        .bind(qr_id)
        .fetch_one(pool)
        .await
        .expect("count query should succeed")
}

// ---------------------------------------------------------------------------
// Submission pipeline
// ---------------------------------------------------------------------------

/// Happy path: one submission consumes the token, creates the reward,
/// and the 340g tier goes out as one send with repeat_count 2.
#[sqlx::test(migrations = "../db/migrations")]
async fn submission_delivers_bundle_and_resolves_sent(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let sender = RecordingSender::ok();
    let (_, intake) = services(&pool, Arc::clone(&sender));

    let outcome = intake
        .submit(submission(token.id, "0712345678"))
        .await
        .expect("submission should succeed");

    assert_eq!(outcome.reward_status, RewardStatus::Sent);
    assert_eq!(outcome.transaction_id.as_deref(), Some("ATPid_1"));
    assert_eq!(sender.calls(), 1);
    assert_eq!(sender.last_repeat(), 2);

    let token = QrTokenRepo::find_by_id(&pool, token.id)
        .await
        .unwrap()
        .unwrap();
    assert!(token.is_used);
    assert_eq!(token.used_by.as_deref(), Some("+254712345678"));

    let reward = RewardRepo::find_by_id(&pool, outcome.reward_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reward.status, "sent");
    assert_eq!(reward.transaction_id.as_deref(), Some("ATPid_1"));
    assert!(reward.sent_at.is_some());
}

/// A second submission for the same (phone, token) pair is a conflict
/// and creates no second reward row.
#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_submission_is_conflict_with_single_reward(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let (_, intake) = services(&pool, RecordingSender::ok());

    intake
        .submit(submission(token.id, "0712345678"))
        .await
        .expect("first submission should succeed");

    let err = intake
        .submit(submission(token.id, "0712345678"))
        .await
        .expect_err("duplicate must be rejected");
    assert!(matches!(err, LedgerError::Core(CoreError::Conflict(_))));

    assert_eq!(reward_count_for_token(&pool, token.id).await, 1);
}

/// A consumed token is rejected for any other customer.
#[sqlx::test(migrations = "../db/migrations")]
async fn used_token_is_rejected_for_second_customer(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let (_, intake) = services(&pool, RecordingSender::ok());

    intake
        .submit(submission(token.id, "0712345678"))
        .await
        .expect("first submission should succeed");

    let err = intake
        .submit(submission(token.id, "0722000111"))
        .await
        .expect_err("used token must be rejected");
    assert!(matches!(err, LedgerError::Core(CoreError::Conflict(_))));

    assert_eq!(reward_count_for_token(&pool, token.id).await, 1);
}

/// A provider failure must not fail the submission: the feedback
/// survives and the reward resolves to failed with the error recorded.
#[sqlx::test(migrations = "../db/migrations")]
async fn provider_failure_preserves_feedback_and_fails_reward(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let (_, intake) = services(&pool, RecordingSender::failing());

    let outcome = intake
        .submit(submission(token.id, "0712345678"))
        .await
        .expect("submission itself must succeed");

    assert_eq!(outcome.reward_status, RewardStatus::Failed);
    assert!(outcome.transaction_id.is_none());
    assert!(outcome.error.is_some());

    let feedback = FeedbackRepo::find_by_id(&pool, outcome.feedback_id)
        .await
        .unwrap();
    assert!(feedback.is_some(), "feedback row must survive the failure");

    let reward = RewardRepo::find_by_id(&pool, outcome.reward_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reward.status, "failed");
    assert!(reward.error_message.is_some());
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// The pending -> processing conditional update is the optimistic lock:
/// a row already in processing cannot be picked up again.
#[sqlx::test(migrations = "../db/migrations")]
async fn processing_reward_cannot_be_picked_up_twice(pool: PgPool) {
    let (sku, token) = seed_sku_and_token(&pool).await;
    let reward = seed_reward(&pool, &sku, &token, "+254712345678").await;
    let sender = RecordingSender::ok();
    let (ledger, _) = services(&pool, Arc::clone(&sender));

    assert!(RewardRepo::mark_processing(&pool, reward.id).await.unwrap());
    assert!(!RewardRepo::mark_processing(&pool, reward.id).await.unwrap());

    let err = ledger
        .process(reward.id)
        .await
        .expect_err("second processor must lose the race");
    assert!(matches!(err, LedgerError::Core(CoreError::Conflict(_))));
    assert_eq!(sender.calls(), 0, "the loser must not send anything");
}

/// A row resolved out-of-band no longer accepts the processor's own
/// sent/failed markers.
#[sqlx::test(migrations = "../db/migrations")]
async fn resolved_row_rejects_stale_markers(pool: PgPool) {
    let (sku, token) = seed_sku_and_token(&pool).await;
    let reward = seed_reward(&pool, &sku, &token, "+254712345678").await;

    assert!(RewardRepo::mark_processing(&pool, reward.id).await.unwrap());
    RewardRepo::resolve_from_notification(&pool, reward.id, true, None, None)
        .await
        .unwrap();

    assert!(!RewardRepo::mark_sent(&pool, reward.id, "ATPid_9").await.unwrap());
    assert!(!RewardRepo::mark_failed(&pool, reward.id, "late").await.unwrap());

    let row = RewardRepo::find_by_id(&pool, reward.id).await.unwrap().unwrap();
    assert_eq!(row.status, "sent");
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// A Success notification without a known transaction id resolves the
/// phone's processing reward to sent, with the provider's timestamp.
#[sqlx::test(migrations = "../db/migrations")]
async fn success_notification_resolves_processing_reward(pool: PgPool) {
    let (sku, token) = seed_sku_and_token(&pool).await;
    let reward = seed_reward(&pool, &sku, &token, "+254712345678").await;
    assert!(RewardRepo::mark_processing(&pool, reward.id).await.unwrap());

    let reconciler = WebhookReconciler::new(pool.clone());
    reconciler
        .reconcile(DeliveryNotification {
            status: Some("Success".to_string()),
            destination: Some("+254712345678".to_string()),
            transaction_date: Some("2024-06-01 09:30:00".to_string()),
            ..Default::default()
        })
        .await;

    let row = RewardRepo::find_by_id(&pool, reward.id).await.unwrap().unwrap();
    assert_eq!(row.status, "sent");
    assert_eq!(row.sent_at.expect("sent_at set").timestamp(), 1717234200);
}

/// A Failed notification records the provider's description.
#[sqlx::test(migrations = "../db/migrations")]
async fn failed_notification_records_provider_error(pool: PgPool) {
    let (sku, token) = seed_sku_and_token(&pool).await;
    let reward = seed_reward(&pool, &sku, &token, "+254712345678").await;
    assert!(RewardRepo::mark_processing(&pool, reward.id).await.unwrap());

    let reconciler = WebhookReconciler::new(pool.clone());
    reconciler
        .reconcile(DeliveryNotification {
            status: Some("Failed".to_string()),
            destination: Some("+254712345678".to_string()),
            description: Some("Insufficient balance".to_string()),
            ..Default::default()
        })
        .await;

    let row = RewardRepo::find_by_id(&pool, reward.id).await.unwrap().unwrap();
    assert_eq!(row.status, "failed");
    assert_eq!(row.error_message.as_deref(), Some("Insufficient balance"));
}

// ---------------------------------------------------------------------------
// Claiming
// ---------------------------------------------------------------------------

/// Claiming a sent reward re-delivers through the gateway and marks the
/// row claimed.
#[sqlx::test(migrations = "../db/migrations")]
async fn claim_redelivers_and_marks_claimed(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let sender = RecordingSender::ok();
    let (ledger, intake) = services(&pool, Arc::clone(&sender));

    let outcome = intake
        .submit(submission(token.id, "0712345678"))
        .await
        .unwrap();
    assert_eq!(sender.calls(), 1);

    let transaction_id = ledger
        .claim(outcome.reward_id, "0712345678")
        .await
        .expect("claim should succeed");
    assert_eq!(transaction_id, "ATPid_2");
    assert_eq!(sender.calls(), 2);

    let row = RewardRepo::find_by_id(&pool, outcome.reward_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "claimed");
    assert!(row.claimed_at.is_some());
}

/// A malformed claim phone is rejected as a validation error before any
/// send, and the reward stays sent.
#[sqlx::test(migrations = "../db/migrations")]
async fn claim_with_malformed_phone_is_rejected(pool: PgPool) {
    let (_, token) = seed_sku_and_token(&pool).await;
    let sender = RecordingSender::ok();
    let (ledger, intake) = services(&pool, Arc::clone(&sender));

    let outcome = intake
        .submit(submission(token.id, "0712345678"))
        .await
        .unwrap();
    assert_eq!(sender.calls(), 1);

    let err = ledger
        .claim(outcome.reward_id, "12345")
        .await
        .expect_err("bad phone must be rejected");
    assert!(matches!(err, LedgerError::Core(CoreError::Validation(_))));
    assert_eq!(sender.calls(), 1, "no bundle may go out for a bad phone");

    let row = RewardRepo::find_by_id(&pool, outcome.reward_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, "sent");
}

/// A reward that has not been sent cannot be claimed.
#[sqlx::test(migrations = "../db/migrations")]
async fn claim_requires_sent_status(pool: PgPool) {
    let (sku, token) = seed_sku_and_token(&pool).await;
    let reward = seed_reward(&pool, &sku, &token, "+254712345678").await;
    let sender = RecordingSender::ok();
    let (ledger, _) = services(&pool, Arc::clone(&sender));

    let err = ledger
        .claim(reward.id, "0712345678")
        .await
        .expect_err("pending reward must not be claimable");
    assert!(matches!(err, LedgerError::Core(CoreError::Conflict(_))));
    assert_eq!(sender.calls(), 0);
}
