//! Reward fulfillment services: the ledger state machine, feedback
//! intake, webhook reconciliation, and the rate-limit store seam.

pub mod error;
pub mod intake;
pub mod ledger;
pub mod rate_limit;
pub mod reconciler;

pub use error::LedgerError;
pub use intake::{FeedbackIntake, SubmissionOutcome, SubmitFeedback};
pub use ledger::{ProcessOutcome, RewardLedger, SweepReport};
pub use rate_limit::{InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};
pub use reconciler::{DeliveryNotification, WebhookReconciler};
