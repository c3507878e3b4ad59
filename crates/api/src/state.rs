use std::sync::Arc;

use zawadi_ledger::{FeedbackIntake, RewardLedger, WebhookReconciler};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: zawadi_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Reward fulfillment state machine.
    pub ledger: Arc<RewardLedger>,
    /// Feedback submission pipeline.
    pub intake: Arc<FeedbackIntake>,
    /// Provider webhook reconciliation.
    pub reconciler: Arc<WebhookReconciler>,
}
