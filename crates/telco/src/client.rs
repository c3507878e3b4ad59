//! HTTP client for the provider's mobile data bundle API.
//!
//! Every call that reaches the provider causes a real, billable
//! delivery to the customer. Deliveries are irreversible: the client
//! never retries beyond the configured policy and never overlaps two
//! sends for the same call.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use zawadi_core::bundle::BundleSize;
use zawadi_core::phone;

use crate::api::{BundleRequest, BundleResponse, Recipient};
use crate::error::TelcoError;
use crate::retry::{retry, RetryPolicy};

/// Per-attempt HTTP timeout. The retry executor bounds attempts, not
/// wall-clock time, so each attempt gets its own transport deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the bundle fulfillment endpoint on the provider host.
const DATA_REQUEST_PATH: &str = "/mobile/data/request";

/// Provider credentials and endpoint configuration.
#[derive(Debug, Clone)]
pub struct TelcoConfig {
    pub api_key: String,
    pub username: String,
    pub product_name: String,
    pub base_url: String,
}

impl TelcoConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default                               |
    /// |----------------------|---------------------------------------|
    /// | `TELCO_API_KEY`      | (required)                            |
    /// | `TELCO_USERNAME`     | (required)                            |
    /// | `TELCO_PRODUCT_NAME` | `Darajaplus`                          |
    /// | `TELCO_BASE_URL`     | `https://bundles.africastalking.com`  |
    ///
    /// Missing credentials are a [`TelcoError::Configuration`]: this
    /// client sends real bundles and has no mock mode.
    pub fn from_env() -> Result<Self, TelcoError> {
        let api_key = std::env::var("TELCO_API_KEY").map_err(|_| {
            TelcoError::Configuration(
                "TELCO_API_KEY is not set; this client sends real data bundles".into(),
            )
        })?;
        let username = std::env::var("TELCO_USERNAME").map_err(|_| {
            TelcoError::Configuration(
                "TELCO_USERNAME is not set; this client sends real data bundles".into(),
            )
        })?;
        let product_name =
            std::env::var("TELCO_PRODUCT_NAME").unwrap_or_else(|_| "Darajaplus".into());
        let base_url = std::env::var("TELCO_BASE_URL")
            .unwrap_or_else(|_| "https://bundles.africastalking.com".into());

        Ok(Self {
            api_key,
            username,
            product_name,
            base_url,
        })
    }
}

/// Outcome of one accepted bundle delivery.
#[derive(Debug, Clone)]
pub struct BundleReceipt {
    /// Provider transaction reference for the last delivered leg.
    pub transaction_id: String,
    /// Normalized recipient number.
    pub phone_number: String,
    /// The bundle unit that was sent.
    pub bundle: BundleSize,
    /// Raw provider entry status (`Sent` or `Queued`).
    pub status: String,
}

/// The gateway seam the ledger depends on. Production uses
/// [`TelcoClient`]; tests substitute their own implementation.
#[async_trait]
pub trait BundleSender: Send + Sync {
    /// Deliver `bundle` to `phone_number`, `repeat_count` times,
    /// strictly sequentially. Returns the receipt of the last leg.
    async fn send_bundle(
        &self,
        phone_number: &str,
        bundle: BundleSize,
        repeat_count: u32,
    ) -> Result<BundleReceipt, TelcoError>;
}

/// Production client for the provider API.
pub struct TelcoClient {
    http: reqwest::Client,
    config: TelcoConfig,
    retry_policy: RetryPolicy,
}

impl TelcoClient {
    pub fn new(config: TelcoConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            http,
            config,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (used by the admin test harness).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Perform exactly one POST to the provider and classify the result.
    async fn send_once(
        &self,
        phone_number: &str,
        bundle: BundleSize,
    ) -> Result<BundleReceipt, TelcoError> {
        let (quantity, unit) = bundle.quantity_and_unit();

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "shopper-reward-system".to_string());
        metadata.insert("bundleSize".to_string(), bundle.as_str().to_string());
        metadata.insert(
            "timestamp".to_string(),
            chrono::Utc::now().to_rfc3339(),
        );

        let payload = BundleRequest {
            username: self.config.username.clone(),
            product_name: self.config.product_name.clone(),
            recipients: vec![Recipient {
                phone_number: phone_number.to_string(),
                quantity,
                unit: unit.to_string(),
                validity: "Day".to_string(),
                metadata,
            }],
        };

        let url = format!("{}{DATA_REQUEST_PATH}", self.config.base_url);

        tracing::debug!(phone = phone_number, bundle = %bundle, url = %url, "Posting bundle request");

        let response = self
            .http
            .post(&url)
            .header("apiKey", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| TelcoError::Provider(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelcoError::Provider(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(TelcoError::Provider(format!(
                "provider returned {status}: {body}"
            )));
        }

        let parsed: BundleResponse = serde_json::from_str(&body)
            .map_err(|e| TelcoError::Provider(format!("invalid JSON response: {e}: {body}")))?;

        let entry = parsed
            .successful_entry()
            .map_err(TelcoError::Provider)?;

        // The provider occasionally omits the reference on queued sends.
        let transaction_id = entry
            .transaction_id
            .clone()
            .unwrap_or_else(|| format!("AT-{}", chrono::Utc::now().timestamp_millis()));

        Ok(BundleReceipt {
            transaction_id,
            phone_number: phone_number.to_string(),
            bundle,
            status: entry.status.clone().unwrap_or_else(|| "Sent".into()),
        })
    }
}

#[async_trait]
impl BundleSender for TelcoClient {
    /// Send `bundle` to `phone_number`, `repeat_count` sequential times.
    ///
    /// The provider has no idempotent replay, so legs are strictly
    /// ordered and the sequence halts at the first leg that exhausts its
    /// own retries. Earlier legs' deliveries are already on the
    /// customer's phone and cannot be reversed; only the final leg's
    /// receipt is returned.
    async fn send_bundle(
        &self,
        phone_number: &str,
        bundle: BundleSize,
        repeat_count: u32,
    ) -> Result<BundleReceipt, TelcoError> {
        let phone = phone::normalize(phone_number)
            .map_err(|e| TelcoError::Format(e.to_string()))?;

        let legs = repeat_count.max(1);
        if legs > 1 {
            tracing::info!(
                phone = %phone,
                bundle = %bundle,
                legs,
                total_mb = bundle.megabytes() * legs,
                "Sending repeated bundles to match displayed reward amount"
            );
        }

        let mut last_receipt = None;
        for leg in 1..=legs {
            tracing::info!(phone = %phone, bundle = %bundle, leg, legs, "Dispatching data bundle");

            let receipt = retry(
                &self.retry_policy,
                |attempt, err: &TelcoError| {
                    tracing::warn!(
                        phone = %phone,
                        attempt,
                        error = %err,
                        "Retrying data bundle send"
                    );
                },
                || self.send_once(&phone, bundle),
            )
            .await
            .map_err(|e| {
                TelcoError::Provider(format!(
                    "leg {leg} of {legs} failed after retries: {e}"
                ))
            })?;

            last_receipt = Some(receipt);
        }

        let receipt = last_receipt.expect("legs >= 1 guarantees a receipt");
        tracing::info!(
            phone = %phone,
            transaction_id = %receipt.transaction_id,
            status = %receipt.status,
            "Data bundle(s) sent"
        );
        Ok(receipt)
    }
}
