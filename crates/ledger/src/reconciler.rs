//! Reconciliation of asynchronous provider delivery callbacks.
//!
//! The direct response to a send can be lost (dropped connection,
//! process crash) while the provider still delivers and later calls
//! back. This module is the only mechanism that resolves rewards stuck
//! in `processing` from such a lost response.
//!
//! Nothing here ever fails outward: the provider retries on non-200,
//! and a retried callback against a non-idempotent receiver could
//! trigger duplicate billable deliveries elsewhere, so internal errors
//! are logged and swallowed.

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use zawadi_core::types::Timestamp;
use zawadi_db::repositories::RewardRepo;
use zawadi_db::DbPool;

/// Transaction category we expect on data bundle callbacks.
const CATEGORY_MOBILE_DATA: &str = "MobileData";

/// Delivery-status notification payload.
///
/// Every field is optional: provider callbacks have drifted over time
/// and an unparseable field must not make the webhook reject the whole
/// notification.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNotification {
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Recipient phone number in international format.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
}

/// Map a provider outcome status to delivered / not delivered.
/// Statuses other than `Success`/`Failed` are progress updates and are
/// ignored.
fn delivery_outcome(status: &str) -> Option<bool> {
    match status {
        "Success" => Some(true),
        "Failed" => Some(false),
        _ => None,
    }
}

/// Parse the provider's transaction timestamp. Accepts RFC 3339 or the
/// provider's `YYYY-MM-DD HH:MM:SS` form; anything else falls back to
/// receipt time at the update site.
fn parse_provider_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Service reconciling ledger state from provider callbacks.
pub struct WebhookReconciler {
    pool: DbPool,
}

impl WebhookReconciler {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Reconcile one notification against the ledger.
    ///
    /// Lookup order: by `transactionId` first; if that finds nothing
    /// (the direct response to the send never arrived, so no id was
    /// persisted), fall back to the most recent `processing` reward for
    /// the destination phone. Known gap: with two simultaneous
    /// `processing` rewards for one phone the fallback may pick the
    /// wrong row; "most recent" is the only tie-break defined.
    pub async fn reconcile(&self, notification: DeliveryNotification) {
        let Some(status) = notification.status.as_deref() else {
            tracing::warn!("Notification without status ignored");
            return;
        };

        let Some(delivered) = delivery_outcome(status) else {
            tracing::debug!(status, "Ignoring non-final notification status");
            return;
        };

        if let Some(category) = notification.category.as_deref() {
            if category != CATEGORY_MOBILE_DATA {
                tracing::warn!(category, "Unexpected category in notification");
            }
        }

        let reward = match self.find_reward(&notification).await {
            Ok(Some(reward)) => reward,
            Ok(None) => {
                tracing::warn!(
                    transaction_id = notification.transaction_id.as_deref().unwrap_or("none"),
                    destination = notification.destination.as_deref().unwrap_or("none"),
                    "No matching reward for notification"
                );
                return;
            }
            Err(err) => {
                tracing::error!(error = %err, "Reward lookup failed during reconciliation");
                return;
            }
        };

        let provider_timestamp = notification
            .transaction_date
            .as_deref()
            .and_then(parse_provider_timestamp);

        let result = RewardRepo::resolve_from_notification(
            &self.pool,
            reward.id,
            delivered,
            provider_timestamp,
            notification.description.as_deref(),
        )
        .await;

        match result {
            Ok(()) => tracing::info!(
                reward_id = %reward.id,
                delivered,
                "Reward reconciled from notification"
            ),
            Err(err) => tracing::error!(
                reward_id = %reward.id,
                error = %err,
                "Failed to update reward from notification"
            ),
        }
    }

    async fn find_reward(
        &self,
        notification: &DeliveryNotification,
    ) -> Result<Option<zawadi_db::models::reward::Reward>, sqlx::Error> {
        if let Some(transaction_id) = notification.transaction_id.as_deref() {
            if let Some(reward) =
                RewardRepo::find_by_transaction_id(&self.pool, transaction_id).await?
            {
                return Ok(Some(reward));
            }
        }

        let Some(destination) = notification.destination.as_deref() else {
            return Ok(None);
        };
        tracing::info!(
            destination,
            "Transaction id unknown, falling back to phone lookup"
        );
        RewardRepo::find_latest_processing_by_phone(&self.pool, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_failed_are_final() {
        assert_eq!(delivery_outcome("Success"), Some(true));
        assert_eq!(delivery_outcome("Failed"), Some(false));
    }

    #[test]
    fn progress_statuses_are_ignored() {
        assert_eq!(delivery_outcome("Queued"), None);
        assert_eq!(delivery_outcome("Sent"), None);
        assert_eq!(delivery_outcome(""), None);
    }

    #[test]
    fn provider_timestamp_accepts_both_forms() {
        let rfc = parse_provider_timestamp("2024-06-01T12:30:00+03:00").unwrap();
        assert_eq!(rfc.timestamp(), 1717234200);

        let plain = parse_provider_timestamp("2024-06-01 09:30:00").unwrap();
        assert_eq!(plain.timestamp(), 1717234200);
    }

    #[test]
    fn unparseable_timestamp_is_none() {
        assert!(parse_provider_timestamp("yesterday").is_none());
        assert!(parse_provider_timestamp("").is_none());
    }

    #[test]
    fn notification_deserializes_from_provider_json() {
        let n: DeliveryNotification = serde_json::from_str(
            r#"{
                "transactionId": "ATPid_abc123",
                "status": "Success",
                "category": "MobileData",
                "destination": "+254712345678",
                "value": "KES 10.0000",
                "transactionDate": "2024-06-01 09:30:00",
                "provider": "Safaricom",
                "requestMetadata": {"source": "shopper-reward-system"}
            }"#,
        )
        .unwrap();

        assert_eq!(n.transaction_id.as_deref(), Some("ATPid_abc123"));
        assert_eq!(n.status.as_deref(), Some("Success"));
        assert_eq!(n.destination.as_deref(), Some("+254712345678"));
    }

    #[test]
    fn notification_tolerates_missing_fields() {
        let n: DeliveryNotification = serde_json::from_str("{}").unwrap();
        assert!(n.transaction_id.is_none());
        assert!(n.status.is_none());
    }
}
