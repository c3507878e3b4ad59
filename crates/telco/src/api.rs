//! Wire types for the provider's mobile data endpoint
//! (`POST /mobile/data/request`) and the response classification rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Entry statuses the provider reports for an accepted delivery.
const STATUS_SENT: &str = "Sent";
const STATUS_QUEUED: &str = "Queued";

/// Request body for a single bundle send.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub username: String,
    pub product_name: String,
    pub recipients: Vec<Recipient>,
}

/// One recipient of a bundle send. The API accepts a list but the
/// gateway always sends exactly one per request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub phone_number: String,
    pub quantity: u32,
    pub unit: String,
    pub validity: String,
    pub metadata: HashMap<String, String>,
}

/// Response body from the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    #[serde(default)]
    pub entries: Vec<BundleEntry>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One per-recipient outcome in the provider response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl BundleResponse {
    /// Extract the successful delivery entry, or the reason there is none.
    ///
    /// A response without entries, or whose first entry's status is not
    /// `Sent` or `Queued`, counts as a failed attempt (and is retried by
    /// the caller's retry executor).
    pub fn successful_entry(&self) -> Result<&BundleEntry, String> {
        let entry = self.entries.first().ok_or_else(|| {
            self.error_message
                .clone()
                .unwrap_or_else(|| "no entries in provider response".to_string())
        })?;

        match entry.status.as_deref() {
            Some(STATUS_SENT) | Some(STATUS_QUEUED) => Ok(entry),
            other => Err(entry.error_message.clone().unwrap_or_else(|| {
                format!("bundle not delivered: status {}", other.unwrap_or("missing"))
            })),
        }
    }
}
